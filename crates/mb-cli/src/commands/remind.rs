use anyhow::Context;
use mb_db::repos::reminder::OverdueReport;
use mb_notify::{NotifyClient, ReportReminder};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RemindCommands;
use crate::commands::shared::date::on_or_today;
use crate::context::AppContext;
use crate::output::output;

/// One line of the `mb remind reports` summary.
#[derive(Debug, Serialize)]
struct ReminderResult {
    student_session_id: String,
    mentor_email: String,
    sent: bool,
    error: Option<String>,
}

/// Handle `mb remind`.
pub async fn handle(action: &RemindCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        RemindCommands::Reports { days, on, dry_run } => {
            let days = days.unwrap_or(ctx.config.general.report_reminder_days);
            let overdue = ctx.service.list_overdue_reports(&ctx.actor, on_or_today(*on), days).await?;
            if *dry_run {
                return output(&overdue, flags.format);
            }
            let results = send_report_reminders(ctx, &overdue).await?;
            output(&results, flags.format)
        }
    }
}

async fn send_report_reminders(
    ctx: &AppContext,
    overdue: &[OverdueReport],
) -> anyhow::Result<Vec<ReminderResult>> {
    if overdue.is_empty() {
        return Ok(Vec::new());
    }
    let client = NotifyClient::new(&ctx.config.notification)
        .context("cannot send reminders; set notification.base_url and notification.api_key")?;

    let reminders: Vec<ReportReminder> = overdue.iter().map(to_reminder).collect();
    let outcomes = client.send_all(&reminders).await;

    let mut results = Vec::with_capacity(outcomes.len());
    for (outcome, report) in outcomes.into_iter().zip(overdue) {
        let (sent, error) = match outcome.result {
            Ok(()) => match ctx.service.mark_reminder_sent(&ctx.actor, &outcome.student_session_id).await {
                Ok(()) => (true, None),
                Err(e) => {
                    tracing::warn!(id = %outcome.student_session_id, error = %e, "reminder sent but not recorded");
                    (true, Some(format!("sent but not recorded: {e}")))
                }
            },
            Err(e) => (false, Some(e.to_string())),
        };
        results.push(ReminderResult {
            student_session_id: outcome.student_session_id,
            mentor_email: report.mentor_email.clone(),
            sent,
            error,
        });
    }
    let sent = results.iter().filter(|r| r.sent).count();
    tracing::info!(sent, failed = results.len() - sent, "report reminders processed");
    Ok(results)
}

fn to_reminder(report: &OverdueReport) -> ReportReminder {
    ReportReminder {
        student_session_id: report.student_session_id.clone(),
        mentor_email: report.mentor_email.clone(),
        mentor_name: report.mentor_name.clone(),
        student_name: report.student_name.clone(),
        attend_on: report.attend_on,
        days_overdue: report.days_overdue,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mb_config::MentorbaseConfig;
    use mb_core::access::Actor;
    use mb_core::entities::{NewMentor, NewStudent};
    use mb_core::values::Email;
    use mb_db::service::ProgramService;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A context with one draft report from 2026-02-07.
    async fn context_with_overdue_report() -> (AppContext, String) {
        let service = ProgramService::new_local(":memory:").await.unwrap();
        let actor = Actor::admin("ops-admin");
        let chapter = service.create_chapter(&actor, "Carlton", None).await.unwrap();
        let mentor = service
            .create_mentor(
                &actor,
                NewMentor {
                    chapter_id: chapter.id().to_string(),
                    email: Email::parse("jo@example.org").unwrap(),
                    first_name: "Jo".into(),
                    last_name: "Bloggs".into(),
                    preferred_name: None,
                    mobile: None,
                    date_of_birth: None,
                    address: None,
                    emergency_contact: None,
                    next_of_kin: None,
                },
            )
            .await
            .unwrap();
        let student = service
            .create_student(
                &actor,
                NewStudent {
                    chapter_id: chapter.id().to_string(),
                    first_name: "Mia".into(),
                    last_name: "Tran".into(),
                    preferred_name: None,
                    date_of_birth: None,
                    year_level: Some(5),
                    school_name: None,
                    address: None,
                    allergies: None,
                    emergency_contact: None,
                    photo_consent: false,
                },
            )
            .await
            .unwrap();
        let (_, booking) = service
            .book_session(&actor, chapter.id(), mentor.id(), student.id(), date(2026, 2, 7))
            .await
            .unwrap();
        let ctx = AppContext {
            service,
            config: MentorbaseConfig::default(),
            actor,
        };
        (ctx, booking.id)
    }

    #[tokio::test]
    async fn reminder_carries_overdue_details() {
        let (ctx, booking_id) = context_with_overdue_report().await;
        let overdue = ctx.service.list_overdue_reports(&ctx.actor, date(2026, 2, 17), 7).await.unwrap();
        let reminder = to_reminder(&overdue[0]);
        assert_eq!(reminder.student_session_id, booking_id);
        assert_eq!(reminder.mentor_email, "jo@example.org");
        assert_eq!(reminder.student_name, "Mia Tran");
        assert_eq!(reminder.days_overdue, 10);
    }

    #[tokio::test]
    async fn unconfigured_service_is_reported() {
        let (ctx, booking_id) = context_with_overdue_report().await;
        let overdue = ctx.service.list_overdue_reports(&ctx.actor, date(2026, 2, 17), 7).await.unwrap();
        let err = send_report_reminders(&ctx, &overdue).await.unwrap_err();
        assert!(format!("{err:#}").contains("notification.base_url"));
        let booking = ctx.service.get_student_session(&booking_id).await.unwrap();
        assert!(booking.reminder_sent_at.is_none());
    }

    #[tokio::test]
    async fn nothing_overdue_needs_no_service() {
        let (ctx, _) = context_with_overdue_report().await;
        let results = send_report_reminders(&ctx, &[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn coordinator_never_reminds_other_chapters() {
        let (ctx, booking_id) = context_with_overdue_report().await;
        let other = ctx.service.create_chapter(&ctx.actor, "Footscray", None).await.unwrap();
        let ctx = AppContext {
            actor: Actor::coordinator("coord", vec![other.id().to_string()]),
            ..ctx
        };
        let overdue = ctx
            .service
            .list_overdue_reports(&ctx.actor, date(2026, 2, 17), 7)
            .await
            .unwrap();
        assert!(overdue.is_empty());
        // No service is configured, so any send attempt would fail here.
        let results = send_report_reminders(&ctx, &overdue).await.unwrap();
        assert!(results.is_empty());
        let booking = ctx.service.get_student_session(&booking_id).await.unwrap();
        assert!(booking.reminder_sent_at.is_none());
    }
}

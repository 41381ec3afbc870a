use mb_core::values::Address;
use mb_db::updates::chapter::ChapterUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{AddressArgs, ChapterCommands};
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb chapter`.
pub async fn handle(action: &ChapterCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ChapterCommands::Create { name, address } => {
            let chapter = ctx
                .service
                .create_chapter(&ctx.actor, name, address_from(address)?)
                .await?;
            output(&chapter, flags.format)
        }
        ChapterCommands::Get { id, name } => {
            let chapter = match (id, name) {
                (Some(id), _) => ctx.service.get_chapter(id).await?,
                (None, Some(name)) => ctx.service.get_chapter_by_name(name).await?,
                (None, None) => anyhow::bail!("pass a chapter ID or --name"),
            };
            output(&chapter, flags.format)
        }
        ChapterCommands::List => output(&ctx.service.list_chapters().await?, flags.format),
        ChapterCommands::Update {
            id,
            name,
            address,
            clear_address,
        } => {
            let mut builder = ChapterUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name.as_str());
            }
            if *clear_address {
                builder = builder.address(None);
            } else if let Some(address) = address_from(address)? {
                builder = builder.address(Some(address));
            }
            let chapter = ctx.service.update_chapter(&ctx.actor, id, builder.build()).await?;
            output(&chapter, flags.format)
        }
        ChapterCommands::Delete { id } => {
            ctx.service.delete_chapter(&ctx.actor, id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}

/// Build an address when any address flag was given.
pub fn address_from(args: &AddressArgs) -> anyhow::Result<Option<Address>> {
    let AddressArgs {
        street,
        suburb,
        state,
        postcode,
    } = args;
    if street.is_none() && suburb.is_none() && state.is_none() && postcode.is_none() {
        return Ok(None);
    }
    let address = Address::new(
        street.as_deref().unwrap_or_default(),
        suburb.as_deref().unwrap_or_default(),
        state.as_deref(),
        postcode.as_deref(),
    )?;
    Ok(Some(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_means_no_address() {
        assert!(address_from(&AddressArgs::default()).unwrap().is_none());
    }

    #[test]
    fn partial_address_is_rejected() {
        let args = AddressArgs {
            postcode: Some("3053".into()),
            ..AddressArgs::default()
        };
        let err = address_from(&args).unwrap_err();
        assert!(err.to_string().contains("street"));
    }

    #[test]
    fn full_address_is_built() {
        let args = AddressArgs {
            street: Some("1 Lygon St".into()),
            suburb: Some("Carlton".into()),
            state: Some("VIC".into()),
            postcode: Some("3053".into()),
        };
        assert!(address_from(&args).unwrap().is_some());
    }
}

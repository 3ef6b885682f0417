//! Maps parsed command-line verbs onto [`Controller`] operations.

use libflexvol::{
    Controller, DetachRequest, FlexResponse, HostFs, MountRequest, Options, StorageClient,
    UnmountRequest,
};
use tracing::{debug, warn};

use crate::cli::Commands;

/// Run one verb and produce the envelope to print.
pub async fn dispatch<C, F>(controller: &Controller<C, F>, command: Commands) -> FlexResponse
where
    C: StorageClient,
    F: HostFs,
{
    debug!(?command, "dispatching");
    match command {
        Commands::Init => controller.init().await,
        Commands::Attach { options, node } => match parse_options(&options) {
            Ok(opts) => {
                debug!(?node, "attach requested");
                controller.attach(opts).await
            }
            Err(resp) => resp,
        },
        Commands::GetVolumeName { options } => match parse_options(&options) {
            Ok(opts) => controller.get_volume_name(opts).await,
            Err(resp) => resp,
        },
        Commands::WaitForAttach { device, options } => {
            match parse_options(options.as_deref().unwrap_or("{}")) {
                Ok(opts) => {
                    debug!(%device, "wait for attach requested");
                    controller.wait_for_attach(&opts)
                }
                Err(resp) => resp,
            }
        }
        Commands::IsAttached { options, node } => match parse_options(&options) {
            Ok(opts) => {
                debug!(?node, "is attached requested");
                controller.is_attached(&opts)
            }
            Err(resp) => resp,
        },
        Commands::Detach { name, node } => controller.detach(DetachRequest { name, node }).await,
        Commands::Mount {
            mount_dir,
            mount_device,
            options,
        } => match parse_options(options.as_deref().unwrap_or("{}")) {
            Ok(opts) => {
                controller
                    .mount(MountRequest {
                        mount_path: mount_dir,
                        mount_device,
                        options: opts,
                    })
                    .await
            }
            Err(resp) => resp,
        },
        Commands::Unmount { mount_dir } => {
            controller
                .unmount(UnmountRequest {
                    mount_path: mount_dir,
                })
                .await
        }
        Commands::Other(args) => {
            let verb = args.first().map(String::as_str).unwrap_or("");
            debug!(verb, "unsupported verb");
            FlexResponse::not_supported(verb)
        }
    }
}

/// Parse the node agent's JSON option string.  Malformed input becomes a
/// `Failure` envelope; the control plane is never consulted.
fn parse_options(raw: &str) -> Result<Options, FlexResponse> {
    serde_json::from_str(raw).map_err(|e| {
        warn!(error = %e, "malformed json options");
        FlexResponse::failure(format!("Failed parsing json options: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options_accepts_objects_only() {
        let opts = parse_options(r#"{"volumeName":"v1","size":10}"#).unwrap();
        assert_eq!(opts.len(), 2);

        assert!(parse_options("not json").is_err());
        assert!(parse_options(r#"["volumeName"]"#).is_err());
    }
}

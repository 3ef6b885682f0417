use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FlexVolume driver entry point.  The node agent invokes one verb per
/// process and reads a single JSON object from stdout.
#[derive(Parser, Debug)]
#[command(name = "rkflex")]
#[command(about = "FlexVolume driver for RK8s volumes", long_about = None)]
pub struct Cli {
    /// Driver configuration file (defaults to $RKFLEX_CONFIG or /etc/rkflex/rkflex.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Initialize the driver using ./rkflex init")]
    Init,
    #[command(about = "Ensure a volume exists using ./rkflex attach <json-options> [node]")]
    Attach {
        #[arg(value_name = "JSON_OPTIONS")]
        options: String,
        #[arg(value_name = "NODE_NAME")]
        node: Option<String>,
    },
    #[command(name = "getvolumename")]
    #[command(about = "Print the cluster-unique volume name")]
    GetVolumeName {
        #[arg(value_name = "JSON_OPTIONS")]
        options: String,
    },
    #[command(name = "waitforattach")]
    #[command(about = "Wait until the volume is attached")]
    WaitForAttach {
        #[arg(value_name = "MOUNT_DEVICE")]
        device: String,
        #[arg(value_name = "JSON_OPTIONS")]
        options: Option<String>,
    },
    #[command(name = "isattached")]
    #[command(about = "Report whether the volume is attached")]
    IsAttached {
        #[arg(value_name = "JSON_OPTIONS")]
        options: String,
        #[arg(value_name = "NODE_NAME")]
        node: Option<String>,
    },
    #[command(about = "Detach a volume from a node using ./rkflex detach <volume-name> [node]")]
    Detach {
        #[arg(value_name = "VOLUME_NAME")]
        name: String,
        #[arg(value_name = "NODE_NAME")]
        node: Option<String>,
    },
    #[command(about = "Link a volume at a pod mount dir using ./rkflex mount <mount-dir> <device> [json-options]")]
    Mount {
        #[arg(value_name = "MOUNT_DIR")]
        mount_dir: PathBuf,
        #[arg(value_name = "MOUNT_DEVICE")]
        mount_device: String,
        #[arg(value_name = "JSON_OPTIONS")]
        options: Option<String>,
    },
    #[command(about = "Unlink the volume at a pod mount dir using ./rkflex unmount <mount-dir>")]
    Unmount {
        #[arg(value_name = "MOUNT_DIR")]
        mount_dir: PathBuf,
    },
    // Verbs such as mountdevice/unmountdevice are answered with "Not supported".
    #[command(external_subcommand)]
    Other(Vec<String>),
}

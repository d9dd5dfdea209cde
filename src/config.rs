use clap::Parser;
use std::path::PathBuf;

/// Convert LabelMe JSON rectangles into YOLO-style detection label files.
#[derive(Parser, Debug, Clone)]
#[command(name = "labelme2det", version, long_about = None)]
pub struct DetArgs {
    /// Directory containing LabelMe JSON files
    pub input_dir: PathBuf,

    /// Directory to create for the label files (must not exist)
    pub output_dir: PathBuf,

    /// Class list file, one class name per line
    #[arg(long = "labels")]
    pub labels: PathBuf,

    /// Do not write visualization images
    #[arg(long = "noviz")]
    pub noviz: bool,

    /// Stop at the first file that fails to convert
    #[arg(long = "fail_fast")]
    pub fail_fast: bool,
}

/// Convert LabelMe JSON shapes into indexed-colour class label images.
#[derive(Parser, Debug, Clone)]
#[command(name = "labelme2seg", version, long_about = None)]
pub struct SegArgs {
    /// Directory containing LabelMe JSON files
    pub input_dir: PathBuf,

    /// Directory to create for the label images (must not exist)
    pub output_dir: PathBuf,

    /// Class list file, one class name per line, starting with _background_
    #[arg(long = "labels")]
    pub labels: PathBuf,

    /// Palette file, one (r, g, b) per class; defaults to the VOC colormap
    #[arg(long = "palette")]
    pub palette: Option<PathBuf>,

    /// Do not write visualization images
    #[arg(long = "noviz")]
    pub noviz: bool,

    /// Also write instance label images
    #[arg(long = "instances")]
    pub instances: bool,

    /// Stop at the first file that fails to convert
    #[arg(long = "fail_fast")]
    pub fail_fast: bool,
}

/// Options shared by both conversion paths once the tables are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub visualize: bool,
    pub instances: bool,
    pub fail_fast: bool,
}

impl From<&DetArgs> for RunOptions {
    fn from(args: &DetArgs) -> Self {
        Self {
            visualize: !args.noviz,
            instances: false,
            fail_fast: args.fail_fast,
        }
    }
}

impl From<&SegArgs> for RunOptions {
    fn from(args: &SegArgs) -> Self {
        Self {
            visualize: !args.noviz,
            instances: args.instances,
            fail_fast: args.fail_fast,
        }
    }
}

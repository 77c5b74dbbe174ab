use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "photo-squeeze",
    about = "Batch image compressor with ID-photo cropping and zip export",
    long_about = "photo-squeeze compresses one or more images to a target quality, size and format. \
                  It can center-crop to fixed ID-photo dimensions (1-inch 295x413, 2-inch 413x579), \
                  tracks per-image progress, and exports a single file or one zip archive.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    photo-squeeze compress photo.jpg -o ./out -q 0.85\n  \
    photo-squeeze compress \"./shots/*.png\" -o ./out -f webp --max-size-mb 2\n  \
    photo-squeeze compress portrait.jpg -o ./out --preset 1inch\n  \
    cat clipboard.png | photo-squeeze compress --stdin -o ./out\n  \
    photo-squeeze info photo.png"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress images and export the results",
        long_about = "Compress all given images concurrently and export them: a single result is \
                      written directly, several results are bundled into one zip archive. \
                      Images already compressed in this run are skipped on re-run."
    )]
    Compress {
        #[arg(
            help = "Input files, directories or glob patterns",
            long_help = "Each input can be a file path, a directory, or a glob expression. \
                         Examples: './images', 'photo.jpg', '/path/to/images/*.png'"
        )]
        inputs: Vec<String>,

        #[arg(
            short = 'o',
            long,
            default_value = ".",
            help = "Output directory for the exported file or archive"
        )]
        output: PathBuf,

        #[arg(
            short = 'p',
            long,
            default_value = "original",
            help = "Target size preset (original, 1inch, 2inch, custom)",
            long_help = "Target output sizing mode. '1inch' (295x413) and '2inch' (413x579) \
                         center-crop every image to exact ID-photo pixel dimensions before \
                         compression; 'original' and 'custom' leave dimensions to --max-dimension."
        )]
        preset: String,

        #[arg(
            short = 'q',
            long,
            help = "Quality factor (0.1-1.0, default: 0.9)",
            long_help = "Quality factor from 0.1 (smallest) to 1.0 (best). \
                         For PNG output: >=0.9 uses Zopfli, >=0.7 uses high compression, \
                         lower values use standard compression."
        )]
        quality: Option<f32>,

        #[arg(
            short = 'f',
            long,
            help = "Output format (jpeg, png, webp; default: jpeg)",
            long_help = "Output format for every compressed image, independent of input format."
        )]
        format: Option<String>,

        #[arg(
            long,
            help = "Target maximum output size per image in MB (default: 5)",
            long_help = "Upper bound the compressor works toward per image. Quality and \
                         dimensions are stepped down until the output fits or passes run out."
        )]
        max_size_mb: Option<f64>,

        #[arg(
            short = 'd',
            long,
            help = "Maximum width/height in pixels (default: 2560)",
            long_help = "Longest-side limit applied before encoding. \
                         Ignored when a fixed ID-photo preset is selected."
        )]
        max_dimension: Option<u32>,

        #[arg(
            long,
            help = "Run compression on the async tasks themselves instead of worker threads"
        )]
        no_worker: bool,

        #[arg(
            short = 'r',
            long,
            help = "Process subdirectories recursively",
            long_help = "Recursively collect images from subdirectories when an input is a directory."
        )]
        recursive: bool,

        #[arg(
            long,
            help = "Also read one pasted image from stdin",
            long_help = "Read raw image bytes from standard input and add them to the set, \
                         with a synthesized unique name."
        )]
        stdin: bool,

        #[arg(long, help = "Suppress progress output")]
        quiet: bool,

        #[arg(long, help = "Verbose diagnostics")]
        verbose: bool,
    },

    #[command(
        about = "Display comprehensive image information",
        long_about = "Analyze and display detailed information about an image file including \
                      dimensions, format, file size, and compression recommendations."
    )]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,
    },
}

mod config;
mod logging;
mod ui;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use config::AppConfig;
use retouch_adapters::{
    present_decoded, present_export, present_filters, present_transform, read_load_command,
    BackgroundImageLoader, CandidateFile, CpuCanvasRenderer, FsExportSink, ImageCrateDecoder,
    ImageCrateEncoder, RoundBrushPainter, WalkdirImageScanner,
};
use retouch_application::{
    EditorService, ExportImageCommand, FlipCommand, LoadImageCommand, RotateCommand,
};
use retouch_domain::{CanvasSize, ExportFormat, FilterKind, FlipAxis, RotateDirection};
use tracing::info;

fn main() -> ExitCode {
    logging::init_logging();
    let args: Vec<String> = std::env::args().collect();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::from(1);
        }
    };

    let command = parse_command(&args);
    match run_command(command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            print_usage();
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_editor_service(config: &AppConfig, canvas_padding: u32) -> EditorService {
    EditorService::new(
        Box::new(ImageCrateDecoder),
        Box::new(CpuCanvasRenderer),
        Box::new(RoundBrushPainter),
        Box::new(ImageCrateEncoder),
        Box::new(FsExportSink::new(config.export_dir.clone())),
    )
    .with_canvas_padding(canvas_padding)
    .with_brush(config.brush())
}

#[derive(Debug, Clone, Default, PartialEq)]
struct HeadlessEdits {
    filters: Vec<(FilterKind, i32)>,
    rotate_right: u32,
    flip_horizontal: bool,
    flip_vertical: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Ui {
        path: Option<PathBuf>,
    },
    Info {
        path: PathBuf,
    },
    Export {
        input: PathBuf,
        format: ExportFormat,
        edits: HeadlessEdits,
    },
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

fn parse_command(args: &[String]) -> Result<Command, CommandError> {
    if args.len() <= 1 {
        return Ok(Command::Ui { path: None });
    }

    match args[1].as_str() {
        "ui" => Ok(Command::Ui {
            path: args.get(2).map(PathBuf::from),
        }),
        "info" => {
            let path = args
                .get(2)
                .ok_or_else(|| CommandError::Usage("missing image path".to_string()))?;
            Ok(Command::Info {
                path: PathBuf::from(path),
            })
        }
        "export" => {
            if args.len() < 4 {
                return Err(CommandError::Usage(
                    "export needs an input path and a format".to_string(),
                ));
            }
            let format = args[3]
                .parse::<ExportFormat>()
                .map_err(|error| CommandError::Usage(error.to_string()))?;
            Ok(Command::Export {
                input: PathBuf::from(&args[2]),
                format,
                edits: parse_edits(&args[4..])?,
            })
        }
        other => Err(CommandError::Usage(format!("unknown command: {other}"))),
    }
}

fn parse_edits(args: &[String]) -> Result<HeadlessEdits, CommandError> {
    let mut edits = HeadlessEdits::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--flip-h" => edits.flip_horizontal = !edits.flip_horizontal,
            "--flip-v" => edits.flip_vertical = !edits.flip_vertical,
            "--rotate-right" => edits.rotate_right = flag_value(flag, iter.next())?,
            other => {
                let kind = other
                    .strip_prefix("--")
                    .and_then(|name| name.parse::<FilterKind>().ok())
                    .ok_or_else(|| CommandError::Usage(format!("unknown option: {other}")))?;
                edits.filters.push((kind, flag_value(flag, iter.next())?));
            }
        }
    }
    Ok(edits)
}

fn flag_value<T: std::str::FromStr>(
    flag: &str,
    value: Option<&String>,
) -> Result<T, CommandError> {
    let value = value.ok_or_else(|| CommandError::Usage(format!("{flag} needs a value")))?;
    value
        .parse::<T>()
        .map_err(|_| CommandError::Usage(format!("invalid value for {flag}: {value}")))
}

fn run_command(
    command: Result<Command, CommandError>,
    config: &AppConfig,
) -> Result<(), CommandError> {
    match command? {
        Command::Ui { path } => {
            let files = match path {
                Some(path) => candidate_files(&path)?,
                None => Vec::new(),
            };
            info!(candidates = files.len(), "starting editor window");
            let mut service = build_editor_service(config, config.canvas_padding);
            let loader = BackgroundImageLoader::new();
            ui::launch_window(
                &mut service,
                &loader,
                files,
                ui::WindowSettings {
                    width: config.window_width,
                    height: config.window_height,
                },
            )
            .map_err(CommandError::Runtime)
        }
        Command::Info { path } => {
            let mut service = build_editor_service(config, 0);
            let decoded = service
                .load_image(headless_load(&path)?)
                .map_err(|error| CommandError::Runtime(error.notice()))?;
            println!("{}", present_decoded(&decoded));
            Ok(())
        }
        Command::Export {
            input,
            format,
            edits,
        } => {
            let mut service = build_editor_service(config, 0);
            service
                .load_image(headless_load(&input)?)
                .map_err(|error| CommandError::Runtime(error.notice()))?;
            apply_edits(&mut service, &edits)
                .map_err(|error| CommandError::Runtime(format!("edit failed: {error}")))?;

            let path = service
                .export_image(ExportImageCommand { format })
                .map_err(|error| CommandError::Runtime(format!("export failed: {error}")))?
                .ok_or_else(|| CommandError::Runtime("nothing to export".to_string()))?;
            println!("{}", present_filters(&service.filters()));
            println!("{}", present_transform(&service.transform()));
            println!("{}", present_export(&path));
            Ok(())
        }
    }
}

fn candidate_files(path: &Path) -> Result<Vec<CandidateFile>, CommandError> {
    if path.is_dir() {
        WalkdirImageScanner::default()
            .scan(path)
            .map_err(|error| CommandError::Runtime(format!("scan failed: {error}")))
    } else {
        Ok(vec![CandidateFile::from_path(path)])
    }
}

/// Headless runs render at the image's own size.
fn headless_load(path: &Path) -> Result<LoadImageCommand, CommandError> {
    let container = image::image_dimensions(path)
        .map(|(width, height)| CanvasSize::new(width, height))
        .unwrap_or(CanvasSize::new(1, 1));
    read_load_command(path, container).map_err(|error| CommandError::Runtime(error.to_string()))
}

fn apply_edits(
    service: &mut EditorService,
    edits: &HeadlessEdits,
) -> Result<(), retouch_application::ApplicationError> {
    for (kind, value) in &edits.filters {
        service.set_filter(*kind, *value)?;
    }
    service.commit_filter_adjustment()?;
    for _ in 0..edits.rotate_right {
        service.rotate(RotateCommand {
            direction: RotateDirection::Right,
        })?;
    }
    if edits.flip_horizontal {
        service.flip(FlipCommand {
            axis: FlipAxis::Horizontal,
        })?;
    }
    if edits.flip_vertical {
        service.flip(FlipCommand {
            axis: FlipAxis::Vertical,
        })?;
    }
    Ok(())
}

fn print_usage() {
    println!("usage:");
    println!("  retouch [ui [file-or-folder]]");
    println!("  retouch info <image>");
    println!("  retouch export <image> <jpeg|png> [--brightness N] [--saturation N]");
    println!("                 [--inversion N] [--grayscale N] [--rotate-right N]");
    println!("                 [--flip-h] [--flip-v]");
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        std::iter::once("retouch")
            .chain(values.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_arguments_opens_empty_window() {
        let command = parse_command(&args(&[])).expect("parse");
        assert_eq!(command, Command::Ui { path: None });
    }

    #[test]
    fn parse_export_with_edits() {
        let command = parse_command(&args(&[
            "export",
            "cat.png",
            "jpg",
            "--brightness",
            "140",
            "--grayscale",
            "100",
            "--rotate-right",
            "3",
            "--flip-v",
        ]))
        .expect("export should parse");

        let Command::Export {
            input,
            format,
            edits,
        } = command
        else {
            panic!("expected export command");
        };
        assert_eq!(input, PathBuf::from("cat.png"));
        assert_eq!(format, ExportFormat::Jpeg);
        assert_eq!(
            edits.filters,
            vec![(FilterKind::Brightness, 140), (FilterKind::Grayscale, 100)]
        );
        assert_eq!(edits.rotate_right, 3);
        assert!(edits.flip_vertical);
        assert!(!edits.flip_horizontal);
    }

    #[test]
    fn parse_rejects_unknown_format_and_option() {
        assert!(matches!(
            parse_command(&args(&["export", "cat.png", "gif"])),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            parse_command(&args(&["export", "cat.png", "png", "--contrast", "3"])),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            parse_command(&args(&["export", "cat.png", "png", "--inversion"])),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            parse_command(&args(&["info"])),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn headless_export_writes_edited_image() {
        let dir = TempDir::new().expect("tempdir");
        let input = dir.path().join("wide.png");
        image::RgbaImage::from_pixel(6, 2, image::Rgba([200, 100, 50, 255]))
            .save(&input)
            .expect("save");
        let config = AppConfig {
            export_dir: dir.path().join("out"),
            ..AppConfig::default()
        };

        let command = Command::Export {
            input,
            format: ExportFormat::Png,
            edits: HeadlessEdits {
                filters: vec![(FilterKind::Inversion, 100)],
                rotate_right: 2,
                ..HeadlessEdits::default()
            },
        };
        run_command(Ok(command), &config)
            .map_err(|error| format!("{error:?}"))
            .expect("export");

        let written = image::open(dir.path().join("out").join("edited-image.png"))
            .expect("open export")
            .to_rgba8();
        assert_eq!(written.dimensions(), (6, 2));
        assert_eq!(written.get_pixel(0, 0).0, [55, 155, 205, 255]);
    }

    #[test]
    fn non_image_input_reports_notice() {
        let dir = TempDir::new().expect("tempdir");
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, b"hello").expect("write");

        let result = run_command(Ok(Command::Info { path: input }), &AppConfig::default());
        let Err(CommandError::Runtime(message)) = result else {
            panic!("expected runtime error");
        };
        assert_eq!(message, "Please select a valid image file.");
    }
}

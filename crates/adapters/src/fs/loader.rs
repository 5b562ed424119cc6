use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use retouch_application::{ApplicationError, LoadImageCommand, LoadTicket};
use retouch_domain::{media_type_for_path, CanvasSize};
use tracing::debug;

/// Reads a file into the command the editor loads from.
pub fn read_load_command(
    path: &Path,
    container: CanvasSize,
) -> Result<LoadImageCommand, ApplicationError> {
    let bytes = fs::read(path)
        .map_err(|error| ApplicationError::Io(format!("{}: {error}", path.display())))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(LoadImageCommand {
        file_name,
        media_type: media_type_for_path(path),
        bytes,
        container,
    })
}

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub path: PathBuf,
    pub container: CanvasSize,
}

#[derive(Debug)]
pub struct LoadedFile {
    pub ticket: LoadTicket,
    pub path: PathBuf,
    pub result: Result<LoadImageCommand, ApplicationError>,
}

/// Reads files on a worker thread so the window keeps drawing. Only the
/// newest request is read; older queued ones are skipped.
pub struct BackgroundImageLoader {
    latest_ticket: Arc<AtomicU64>,
    submit_tx: mpsc::Sender<LoadRequest>,
    result_rx: Mutex<mpsc::Receiver<LoadedFile>>,
}

impl BackgroundImageLoader {
    pub fn new() -> Self {
        let (submit_tx, submit_rx) = mpsc::channel::<LoadRequest>();
        let (result_tx, result_rx) = mpsc::channel::<LoadedFile>();
        let latest_ticket = Arc::new(AtomicU64::new(0));

        spawn_worker(submit_rx, result_tx, Arc::clone(&latest_ticket));

        Self {
            latest_ticket,
            submit_tx,
            result_rx: Mutex::new(result_rx),
        }
    }

    pub fn submit(&self, request: LoadRequest) -> Result<(), ApplicationError> {
        self.latest_ticket
            .fetch_max(request.ticket.get(), Ordering::SeqCst);
        self.submit_tx
            .send(request)
            .map_err(|error| ApplicationError::Io(format!("failed to enqueue image load: {error}")))
    }

    /// Returns the newest finished load, if any, discarding older ones.
    pub fn try_receive(&self) -> Result<Option<LoadedFile>, ApplicationError> {
        let receiver = self
            .result_rx
            .lock()
            .map_err(|_| ApplicationError::Io("image loader lock poisoned".to_string()))?;

        let mut newest = match receiver.try_recv() {
            Ok(loaded) => loaded,
            Err(mpsc::TryRecvError::Empty) => return Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                return Err(ApplicationError::Io(
                    "image loader channel disconnected".to_string(),
                ))
            }
        };
        while let Ok(next) = receiver.try_recv() {
            debug!(ticket = newest.ticket.get(), "superseded load result dropped");
            newest = next;
        }
        Ok(Some(newest))
    }
}

impl Default for BackgroundImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_worker(
    submit_rx: mpsc::Receiver<LoadRequest>,
    result_tx: mpsc::Sender<LoadedFile>,
    latest_ticket: Arc<AtomicU64>,
) {
    thread::spawn(move || {
        while let Ok(mut request) = submit_rx.recv() {
            while let Ok(next) = submit_rx.try_recv() {
                request = next;
            }
            if request.ticket.get() < latest_ticket.load(Ordering::SeqCst) {
                continue;
            }

            let result = read_load_command(&request.path, request.container);
            debug!(
                ticket = request.ticket.get(),
                path = %request.path.display(),
                ok = result.is_ok(),
                "image file read"
            );
            let loaded = LoadedFile {
                ticket: request.ticket,
                path: request.path,
                result,
            };
            if result_tx.send(loaded).is_err() {
                return;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use retouch_application::{CompleteLoadCommand, EditorService, LoadOutcome};
    use tempfile::TempDir;

    use super::*;
    use crate::{
        CpuCanvasRenderer, FsExportSink, ImageCrateDecoder, ImageCrateEncoder, RoundBrushPainter,
    };

    const CONTAINER: CanvasSize = CanvasSize {
        width: 400,
        height: 300,
    };

    fn editor(dir: &TempDir) -> EditorService {
        EditorService::new(
            Box::new(ImageCrateDecoder),
            Box::new(CpuCanvasRenderer),
            Box::new(RoundBrushPainter),
            Box::new(ImageCrateEncoder),
            Box::new(FsExportSink::new(dir.path())),
        )
    }

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .expect("save png");
        path
    }

    fn wait_for(loader: &BackgroundImageLoader) -> LoadedFile {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(loaded) = loader.try_receive().expect("poll") {
                return loaded;
            }
            assert!(Instant::now() < deadline, "timed out waiting for load");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn read_load_command_derives_name_and_media_type() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_png(&dir, "photo.png", 2, 2);

        let command = read_load_command(&path, CONTAINER).expect("read");
        assert_eq!(command.file_name, "photo.png");
        assert_eq!(command.media_type.as_str(), "image/png");
        assert!(!command.bytes.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().expect("tempdir");
        let result = read_load_command(&dir.path().join("gone.png"), CONTAINER);
        assert!(matches!(result, Err(ApplicationError::Io(_))));
    }

    #[test]
    fn newest_request_wins() {
        let dir = TempDir::new().expect("tempdir");
        let first = write_png(&dir, "first.png", 8, 4);
        let second = write_png(&dir, "second.png", 4, 8);
        let mut service = editor(&dir);
        let loader = BackgroundImageLoader::new();

        let stale = service.begin_load();
        loader
            .submit(LoadRequest {
                ticket: stale,
                path: first,
                container: CONTAINER,
            })
            .expect("submit");
        let current = service.begin_load();
        loader
            .submit(LoadRequest {
                ticket: current,
                path: second.clone(),
                container: CONTAINER,
            })
            .expect("submit");

        let mut loaded = wait_for(&loader);
        // The worker may already have read the first file; keep polling
        // until the newest arrives.
        while loaded.ticket != current {
            let outcome = service
                .complete_load(CompleteLoadCommand {
                    ticket: loaded.ticket,
                    load: loaded.result.expect("read"),
                })
                .expect("complete");
            assert_eq!(outcome, LoadOutcome::Stale);
            loaded = wait_for(&loader);
        }

        assert_eq!(loaded.path, second);
        let outcome = service
            .complete_load(CompleteLoadCommand {
                ticket: loaded.ticket,
                load: loaded.result.expect("read"),
            })
            .expect("complete");
        assert!(matches!(outcome, LoadOutcome::Loaded(decoded) if decoded.file_name == "second.png"));
        assert!(!service.history().is_empty());
    }
}

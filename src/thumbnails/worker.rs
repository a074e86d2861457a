use std::{
    path::PathBuf,
    sync::{
        mpsc,
        Arc,
    },
    thread::JoinHandle,
};

use image::DynamicImage;

use super::{
    ThumbnailCache,
    ThumbnailSize,
};

pub type ThumbnailCallback = Box<dyn FnOnce(PathBuf, Option<DynamicImage>) + Send>;

pub struct ThumbnailJob {
    pub path: PathBuf,
    pub size: ThumbnailSize,
    pub callback: ThumbnailCallback,
}

/// Single consumer thread draining thumbnail requests so a caller (e.g. a
/// GUI event loop) never blocks on decode. Started lazily on the first
/// enqueue; a `None` sentinel shuts it down. FIFO, no priorities.
pub struct ThumbnailWorker {
    cache: Arc<ThumbnailCache>,
    sender: Option<mpsc::Sender<Option<ThumbnailJob>>>,
    handle: Option<JoinHandle<()>>,
}

impl ThumbnailWorker {
    pub fn new(cache: Arc<ThumbnailCache>) -> Self {
        ThumbnailWorker { cache, sender: None, handle: None }
    }

    pub fn enqueue(&mut self, job: ThumbnailJob) {
        self.ensure_started();
        if let Some(sender) = &self.sender {
            if sender.send(Some(job)).is_err() {
                log::warn!("Thumbnail worker channel closed, dropping request");
            }
        }
    }

    fn ensure_started(&mut self) {
        if self.sender.is_some() {
            return;
        }

        let (sender, receiver) = mpsc::channel::<Option<ThumbnailJob>>();
        let cache = Arc::clone(&self.cache);

        let handle = std::thread::spawn(move || {
            while let Ok(message) = receiver.recv() {
                let Some(job) = message else { break };
                let result = cache.get_thumbnail(&job.path, job.size);
                (job.callback)(job.path, result);
            }
        });

        self.sender = Some(sender);
        self.handle = Some(handle);
    }

    /// Enqueue the sentinel and wait for the thread to drain and exit.
    pub fn stop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(None);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ThumbnailWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::{
            Arc,
            Mutex,
        },
    };

    use image::RgbImage;

    use super::*;
    use crate::thumbnails::THUMBNAIL_SIZE;

    #[test]
    fn worker_delivers_results_in_order() {
        let dir = std::env::temp_dir().join(format!("tarologue-test-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();

        let source = dir.join("card.png");
        RgbImage::new(400, 600).save(&source).unwrap();
        let missing = dir.join("missing.png");

        let cache = Arc::new(ThumbnailCache::new(dir.join("thumbs")));
        let mut worker = ThumbnailWorker::new(Arc::clone(&cache));

        let results: Arc<Mutex<Vec<(PathBuf, bool)>>> = Arc::new(Mutex::new(Vec::new()));

        for path in [source.clone(), missing.clone()] {
            let results = Arc::clone(&results);
            worker.enqueue(ThumbnailJob {
                path,
                size: THUMBNAIL_SIZE,
                callback: Box::new(move |path, result| {
                    results.lock().unwrap().push((path, result.is_some()));
                }),
            });
        }

        worker.stop();

        let results = results.lock().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], (source, true));
        assert_eq!(results[1], (missing, false));

        let _ = fs::remove_dir_all(&dir);
    }
}

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use threadpool::ThreadPool;

use crate::{
    data::{Config, DetailRequest, PageRequest, Photos, SearchRequest, Settled},
    error::Error,
    webapi::PhotoSource,
};

use super::Debounce;

/// Drives a [`Photos`] collection on behalf of the UI.
///
/// The controller is owned by a single thread, which is the only writer of
/// the collection.  Network calls run on a worker pool and their results
/// come back over a channel; they are applied in `pump`/`wait`, on the
/// owning thread.
pub struct PhotosController {
    photos: Photos,
    source: Arc<dyn PhotoSource>,
    pool: ThreadPool,
    sender: Sender<Settled>,
    receiver: Receiver<Settled>,
    search_input: Debounce<String>,
    in_flight: usize,
}

impl PhotosController {
    pub fn new(source: Arc<dyn PhotoSource>, config: &Config) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            photos: Photos::new(config.page_size),
            source,
            pool: ThreadPool::with_name("photo_requests".into(), config.worker_threads.max(1)),
            sender,
            receiver,
            search_input: Debounce::trailing(config.search_debounce()),
            in_flight: 0,
        }
    }

    pub fn photos(&self) -> &Photos {
        &self.photos
    }

    pub fn load_page(&mut self, reset: bool) {
        let req = self.photos.begin_page(reset);
        log::debug!("loading photos from {} (reset: {})", req.offset, req.reset);
        self.dispatch(Request::Page(req));
    }

    /// Fetches the next page, unless the list is exhausted or a list fetch
    /// or search is still pending.
    pub fn load_more(&mut self) -> bool {
        if !self.photos.has_more() || self.photos.is_loading_collection() {
            return false;
        }
        self.load_page(false);
        true
    }

    /// Searches right away.  A blank query returns to the first page.
    pub fn search(&mut self, query: &str) {
        self.search_input.cancel();
        match self.photos.begin_search(query) {
            Some(req) => {
                log::debug!("searching photos for {:?}", req.query);
                self.dispatch(Request::Search(req));
            }
            None => self.load_page(true),
        }
    }

    /// Records search box input.  The search itself runs once the input has
    /// been quiet for the configured period.
    pub fn search_input(&mut self, text: impl Into<String>) {
        self.search_input.update(text.into(), Instant::now());
    }

    pub fn load_by_id(&mut self, id: u64) {
        let req = self.photos.begin_detail(id);
        log::debug!("loading photo {}", id);
        self.dispatch(Request::Detail(req));
    }

    /// Nothing in flight and no search input waiting.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.search_input.deadline().is_none()
    }

    /// Applies everything that is ready without blocking.  Returns whether
    /// the collection changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = self.fire_search_input(Instant::now());
        while let Ok(settled) = self.receiver.try_recv() {
            changed |= self.settle(settled);
        }
        changed
    }

    /// Blocks until one response arrives or pending search input becomes
    /// due, but no longer than `timeout`.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let now = Instant::now();
        let wake_at = match self.search_input.deadline() {
            Some(deadline) => deadline.min(now + timeout),
            None => now + timeout,
        };
        match self
            .receiver
            .recv_timeout(wake_at.saturating_duration_since(now))
        {
            Ok(settled) => self.settle(settled),
            Err(RecvTimeoutError::Timeout) => self.fire_search_input(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Keeps waiting until idle.  Returns `false` if `timeout` ran out first.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_idle() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait(deadline - now);
        }
        true
    }

    fn dispatch(&mut self, request: Request) {
        let source = self.source.clone();
        let sender = self.sender.clone();
        self.in_flight += 1;
        self.pool.execute(move || {
            // A panicking request must still settle, or the collection would
            // look busy forever.
            let settled =
                panic::catch_unwind(AssertUnwindSafe(|| request.clone().run(source.as_ref())))
                    .unwrap_or_else(|_| {
                        log::error!("photo request panicked: {:?}", request);
                        request.fail(Error::NetworkError("request aborted".into()))
                    });
            if sender.send(settled).is_err() {
                log::warn!("photo response arrived after the controller was dropped");
            }
        });
    }

    fn settle(&mut self, settled: Settled) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.photos.settle(settled)
    }

    fn fire_search_input(&mut self, now: Instant) -> bool {
        match self.search_input.fire(now) {
            Some(text) => {
                self.search(&text);
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Debug)]
enum Request {
    Page(PageRequest),
    Search(SearchRequest),
    Detail(DetailRequest),
}

impl Request {
    fn run(self, source: &dyn PhotoSource) -> Settled {
        match self {
            Self::Page(req) => {
                let res = source.get_photos(req.offset, req.limit);
                Settled::Page(req, res)
            }
            Self::Search(req) => {
                let res = source.search_photos(&req.query);
                Settled::Search(req, res)
            }
            Self::Detail(req) => {
                let res = source.get_photo(req.id);
                Settled::Detail(req, res)
            }
        }
    }

    fn fail(self, err: Error) -> Settled {
        match self {
            Self::Page(req) => Settled::Page(req, Err(err)),
            Self::Search(req) => Settled::Search(req, Err(err)),
            Self::Detail(req) => Settled::Detail(req, Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{Photo, Status},
        error::Error,
        webapi::MockPhotoSource,
    };
    use std::sync::atomic::{AtomicBool, Ordering};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn photo(id: u64) -> Photo {
        Photo {
            album_id: 1,
            id,
            title: format!("photo {id}"),
            url: format!("https://dummyimage.com/600/{id}"),
            thumbnail_url: format!("https://dummyimage.com/150/{id}"),
        }
    }

    fn config() -> Config {
        Config {
            search_debounce_ms: 20,
            ..Config::default()
        }
    }

    fn controller(source: MockPhotoSource) -> PhotosController {
        PhotosController::new(Arc::new(source), &config())
    }

    #[test]
    fn pages_until_a_short_page() {
        let mut source = MockPhotoSource::new();
        source
            .expect_get_photos()
            .times(2)
            .returning(|offset, limit| {
                assert_eq!(limit, 10);
                let count = if offset == 0 { 10 } else { 3 };
                Ok((1..=count).map(|i| photo(offset as u64 + i)).collect())
            });
        let mut controller = controller(source);

        controller.load_page(true);
        assert!(!controller.load_more(), "list fetch already in flight");
        assert!(controller.run_until_idle(TIMEOUT));

        assert!(controller.load_more());
        assert!(controller.run_until_idle(TIMEOUT));

        let photos = controller.photos();
        assert_eq!(photos.items().len(), 13);
        assert_eq!(photos.items()[12].id, 13);
        assert!(!photos.has_more());
        assert_eq!(photos.page(), 2);
        assert!(!controller.load_more(), "list is exhausted");
    }

    #[test]
    fn server_error_keeps_items() {
        let mut source = MockPhotoSource::new();
        source
            .expect_get_photos()
            .times(2)
            .returning(|offset, _| match offset {
                0 => Ok((1..=10).map(photo).collect()),
                _ => Err(Error::HttpError { status: 500 }),
            });
        let mut controller = controller(source);

        controller.load_page(true);
        assert!(controller.run_until_idle(TIMEOUT));
        controller.load_more();
        assert!(controller.run_until_idle(TIMEOUT));

        let photos = controller.photos();
        assert_eq!(photos.items().len(), 10);
        assert_eq!(photos.status(), Status::Failed);
        assert_eq!(photos.error(), Some(&Error::HttpError { status: 500 }));
    }

    #[test]
    fn search_input_is_debounced() {
        let mut source = MockPhotoSource::new();
        source
            .expect_search_photos()
            .times(1)
            .returning(|query| {
                assert_eq!(query, "sunset");
                Ok(vec![photo(4), photo(8)])
            });
        let mut controller = controller(source);

        controller.search_input("s");
        controller.search_input("sun");
        controller.search_input("sunset");
        assert!(!controller.is_idle());
        assert!(controller.run_until_idle(TIMEOUT));

        let photos = controller.photos();
        assert_eq!(photos.items().len(), 2);
        assert!(!photos.has_more());
        assert_eq!(photos.status(), Status::Succeeded);
    }

    #[test]
    fn blank_search_input_returns_to_browsing() {
        let mut source = MockPhotoSource::new();
        source.expect_search_photos().never();
        source
            .expect_get_photos()
            .times(1)
            .returning(|offset, limit| {
                assert_eq!((offset, limit), (0, 10));
                Ok((1..=10).map(photo).collect())
            });
        let mut controller = controller(source);

        controller.search_input("   ");
        assert!(controller.run_until_idle(TIMEOUT));

        assert_eq!(controller.photos().items().len(), 10);
        assert_eq!(controller.photos().page(), 1);
        assert!(controller.photos().has_more());
    }

    #[test]
    fn explicit_search_cancels_pending_input() {
        let mut source = MockPhotoSource::new();
        source
            .expect_search_photos()
            .times(1)
            .returning(|query| {
                assert_eq!(query, "magnam");
                Ok(vec![photo(2)])
            });
        let mut controller = controller(source);

        controller.search_input("mag");
        controller.search("magnam");
        assert!(controller.run_until_idle(TIMEOUT));
        assert_eq!(controller.photos().items()[0].id, 2);
    }

    #[test]
    fn missing_photo_leaves_detail_empty() {
        let mut source = MockPhotoSource::new();
        source
            .expect_get_photo()
            .times(2)
            .returning(|id| match id {
                1 => Ok(photo(1)),
                _ => Err(Error::HttpError { status: 404 }),
            });
        let mut controller = controller(source);

        controller.load_by_id(1);
        assert!(controller.run_until_idle(TIMEOUT));
        assert_eq!(controller.photos().current_photo().map(|p| p.id), Some(1));

        controller.load_by_id(5001);
        assert!(controller.photos().current_photo().is_none());
        assert!(controller.run_until_idle(TIMEOUT));

        let photos = controller.photos();
        assert!(photos.current_photo().is_none());
        assert_eq!(photos.status(), Status::Failed);
        assert!(photos.error().unwrap().is_not_found());
    }

    #[test]
    fn pump_applies_ready_responses() {
        let mut source = MockPhotoSource::new();
        source
            .expect_get_photo()
            .returning(|id| Ok(photo(id)));
        let mut controller = controller(source);

        controller.load_by_id(3);
        let deadline = Instant::now() + TIMEOUT;
        while !controller.pump() {
            assert!(Instant::now() < deadline, "response never arrived");
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(controller.is_idle());
        assert_eq!(controller.photos().current_photo().map(|p| p.id), Some(3));
    }

    struct PanicsOnce {
        panicked: AtomicBool,
    }

    impl PhotoSource for PanicsOnce {
        fn get_photos(&self, offset: usize, _limit: usize) -> Result<Vec<Photo>, Error> {
            if !self.panicked.swap(true, Ordering::SeqCst) {
                panic!("decoder blew up");
            }
            Ok((1..=10).map(|i| photo(offset as u64 + i)).collect())
        }

        fn search_photos(&self, _query: &str) -> Result<Vec<Photo>, Error> {
            Ok(Vec::new())
        }

        fn get_photo(&self, id: u64) -> Result<Photo, Error> {
            Ok(photo(id))
        }
    }

    #[test]
    fn panicking_request_still_settles() {
        let source = PanicsOnce {
            panicked: AtomicBool::new(false),
        };
        let mut controller = PhotosController::new(Arc::new(source), &config());

        controller.load_page(true);
        assert!(controller.run_until_idle(TIMEOUT));

        let photos = controller.photos();
        assert!(!photos.is_loading_collection());
        assert_eq!(photos.status(), Status::Failed);
        assert!(matches!(photos.error(), Some(Error::NetworkError(_))));

        controller.load_page(true);
        assert!(controller.run_until_idle(TIMEOUT));
        assert_eq!(controller.photos().items().len(), 10);
        assert_eq!(controller.photos().status(), Status::Succeeded);
    }
}

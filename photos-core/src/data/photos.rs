use crate::{
    data::{Photo, Promise, DEFAULT_PAGE_SIZE},
    error::Error,
    util::Sequence,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub seq: u64,
    pub offset: usize,
    pub limit: usize,
    pub reset: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DetailRequest {
    pub seq: u64,
    pub id: u64,
}

/// A finished request together with the request it answers.
#[derive(Debug)]
pub enum Settled {
    Page(PageRequest, Result<Vec<Photo>, Error>),
    Search(SearchRequest, Result<Vec<Photo>, Error>),
    Detail(DetailRequest, Result<Photo, Error>),
}

/// The browsable photo collection plus the currently opened photo.
///
/// Every operation comes in two halves.  `begin_*` marks the state as
/// loading and returns a request tagged with a sequence number; `settle`
/// applies the response later.  List fetches and searches both write
/// `items`, so they share one staleness watermark: a response older than
/// one already settled is dropped.  `status` follows only the most recently
/// issued request; `error` keeps the last failure that was not dropped.
#[derive(Debug)]
pub struct Photos {
    items: Vec<Photo>,
    detail: Promise<Photo, DetailRequest>,
    status: Status,
    error: Option<Error>,
    page: usize,
    has_more: bool,
    page_size: usize,
    sequence: Sequence<u64>,
    last_issued: u64,
    last_collection_issued: u64,
    last_collection_settled: u64,
}

impl Photos {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            detail: Promise::Empty,
            status: Status::Idle,
            error: None,
            page: 0,
            has_more: true,
            page_size: page_size.max(1),
            sequence: Sequence::new(1),
            last_issued: 0,
            last_collection_issued: 0,
            last_collection_settled: 0,
        }
    }

    pub fn items(&self) -> &[Photo] {
        &self.items
    }

    pub fn current_photo(&self) -> Option<&Photo> {
        self.detail.resolved()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading_collection(&self) -> bool {
        self.last_collection_issued > self.last_collection_settled
    }

    pub fn begin_page(&mut self, reset: bool) -> PageRequest {
        let offset = if reset { 0 } else { self.page * self.page_size };
        let seq = self.issue_collection();
        PageRequest {
            seq,
            offset,
            limit: self.page_size,
            reset,
        }
    }

    /// Returns `None` for a blank query; the caller should go back to
    /// browsing with `begin_page(true)` instead.
    pub fn begin_search(&mut self, query: &str) -> Option<SearchRequest> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(SearchRequest {
            seq: self.issue_collection(),
            query: query.to_owned(),
        })
    }

    pub fn begin_detail(&mut self, id: u64) -> DetailRequest {
        let req = DetailRequest {
            seq: self.issue(),
            id,
        };
        // Never show the previous photo while a different one is loading.
        self.detail.defer(req);
        req
    }

    /// Applies a response.  Returns `false` if it was stale and dropped.
    pub fn settle(&mut self, settled: Settled) -> bool {
        match settled {
            Settled::Page(req, res) => self.settle_page(req, res),
            Settled::Search(req, res) => self.settle_search(req, res),
            Settled::Detail(req, res) => self.settle_detail(req, res),
        }
    }

    fn settle_page(&mut self, req: PageRequest, res: Result<Vec<Photo>, Error>) -> bool {
        if !self.accept_collection(req.seq) {
            return false;
        }
        let outcome = match res {
            Ok(photos) => {
                self.has_more = photos.len() == req.limit;
                if req.reset {
                    self.items = photos;
                } else {
                    self.items.extend(photos);
                }
                self.page = req.offset / req.limit + 1;
                Ok(())
            }
            Err(err) => Err(err),
        };
        self.finish(req.seq, outcome);
        true
    }

    fn settle_search(&mut self, req: SearchRequest, res: Result<Vec<Photo>, Error>) -> bool {
        if !self.accept_collection(req.seq) {
            return false;
        }
        let outcome = match res {
            Ok(photos) => {
                log::debug!("search {:?} matched {} photos", req.query, photos.len());
                self.items = photos;
                self.has_more = false;
                Ok(())
            }
            Err(err) => Err(err),
        };
        self.finish(req.seq, outcome);
        true
    }

    fn settle_detail(&mut self, req: DetailRequest, res: Result<Photo, Error>) -> bool {
        let outcome = res.as_ref().map(|_| ()).map_err(Clone::clone);
        if !self.detail.update((req, res)) {
            log::warn!("dropping stale response for photo {}", req.id);
            return false;
        }
        self.finish(req.seq, outcome);
        true
    }

    fn issue(&mut self) -> u64 {
        let seq = self.sequence.advance();
        self.last_issued = seq;
        self.status = Status::Loading;
        seq
    }

    fn issue_collection(&mut self) -> u64 {
        let seq = self.issue();
        self.last_collection_issued = seq;
        seq
    }

    fn accept_collection(&mut self, seq: u64) -> bool {
        if seq < self.last_collection_settled {
            log::warn!(
                "dropping stale response #{} (already at #{})",
                seq,
                self.last_collection_settled
            );
            return false;
        }
        self.last_collection_settled = seq;
        true
    }

    fn finish(&mut self, seq: u64, outcome: Result<(), Error>) {
        let latest = seq == self.last_issued;
        match outcome {
            Ok(()) if latest => {
                self.status = Status::Succeeded;
                self.error = None;
            }
            Ok(()) => {}
            Err(err) => {
                if latest {
                    self.status = Status::Failed;
                } else {
                    log::warn!("request #{} failed after being superseded: {}", seq, err);
                }
                self.error = Some(err);
            }
        }
    }
}

impl Default for Photos {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

use anyhow::Result;
use tracing::{debug, warn};

use crate::client::{MetadataFetch, SimilarityFetch};
use crate::error::PopupError;
use crate::models::Grouping;
use crate::tconst::extract_tconst;
use crate::ui::{PopupState, Surface, UserAction};

/// One popup session: runs the fetch pipeline exactly once, then services
/// keys until the user closes the popup. Every pipeline failure collapses
/// to the error surface; there are no retries and no way back to loading.
pub struct Popup<M, S, U> {
    metadata: M,
    similarity: S,
    ui: U,
    limit: u32,
    state: PopupState,
}

impl<M, S, U> Popup<M, S, U>
where
    M: MetadataFetch,
    S: SimilarityFetch,
    U: Surface,
{
    pub fn new(metadata: M, similarity: S, ui: U, limit: u32) -> Self {
        Self {
            metadata,
            similarity,
            ui,
            limit,
            state: PopupState::Loading {
                page_url: String::new(),
                progress: 0,
                stage: "Starting...".to_string(),
            },
        }
    }

    pub async fn run(&mut self, page_url: Option<&str>) -> Result<()> {
        let result = self.open(page_url).await;
        self.ui.cleanup()?;
        result
    }

    async fn open(&mut self, page_url: Option<&str>) -> Result<()> {
        self.fetch_and_render(page_url).await?;
        self.serve_keys()
    }

    /// The pipeline: extract identifier, fetch the movie, fetch the similar
    /// list, in that order. Each stage fully completes before the next one
    /// starts, and each failure point lands on the same error surface.
    async fn fetch_and_render(&mut self, page_url: Option<&str>) -> Result<()> {
        let page_url = page_url.unwrap_or_default().to_string();
        self.set_loading(&page_url, 10, "Reading page address...")?;

        let tconst = match extract_tconst(&page_url) {
            Ok(tconst) => tconst,
            Err(e) => return self.fail(e),
        };
        debug!("page is movie {}", tconst);

        self.set_loading(&page_url, 35, "Looking up the movie...")?;
        let movie = match self.metadata.fetch_movie(&tconst).await {
            Ok(movie) => movie,
            Err(e) => return self.fail(e),
        };

        self.set_loading(
            &page_url,
            70,
            &format!("Finding movies similar to {}...", movie.title),
        )?;
        let similar = match self.similarity.fetch_similar(&tconst, self.limit).await {
            Ok(similar) => similar,
            Err(e) => return self.fail(e),
        };

        debug!(
            "pipeline done: {} similar movies for {}",
            similar.all.len(),
            movie.title
        );
        self.state = PopupState::Content {
            movie,
            similar,
            grouping: Grouping::All,
            selected: 0,
        };
        self.ui.render(&self.state)
    }

    fn serve_keys(&mut self) -> Result<()> {
        loop {
            match self.ui.next_action(&self.state)? {
                UserAction::Quit => return Ok(()),
                UserAction::SelectPrev => self.move_selection(-1)?,
                UserAction::SelectNext => self.move_selection(1)?,
                UserAction::OpenSelected => self.open_selected(),
                UserAction::ShowGrouping(grouping) => self.show_grouping(grouping)?,
            }
        }
    }

    fn move_selection(&mut self, delta: isize) -> Result<()> {
        if let PopupState::Content {
            similar,
            grouping,
            selected,
            ..
        } = &mut self.state
        {
            let len = similar.grouping(*grouping).len();
            if len == 0 {
                return Ok(());
            }
            *selected = selected
                .saturating_add_signed(delta)
                .min(len - 1);
            return self.ui.render(&self.state);
        }
        Ok(())
    }

    fn show_grouping(&mut self, new_grouping: Grouping) -> Result<()> {
        if let PopupState::Content {
            grouping, selected, ..
        } = &mut self.state
        {
            if *grouping != new_grouping {
                *grouping = new_grouping;
                *selected = 0;
                return self.ui.render(&self.state);
            }
        }
        Ok(())
    }

    fn open_selected(&mut self) {
        if let PopupState::Content {
            similar,
            grouping,
            selected,
            ..
        } = &self.state
        {
            if let Some(movie) = similar.grouping(*grouping).get(*selected) {
                let url = movie.imdb_url();
                if let Err(e) = webbrowser::open(&url) {
                    warn!("failed to open {}: {}", url, e);
                }
            }
        }
    }

    fn set_loading(&mut self, page_url: &str, progress: u16, stage: &str) -> Result<()> {
        self.state = PopupState::Loading {
            page_url: page_url.to_string(),
            progress,
            stage: stage.to_string(),
        };
        self.ui.render(&self.state)
    }

    fn fail(&mut self, error: PopupError) -> Result<()> {
        warn!("popup failed: {}", error);
        self.state = PopupState::Error;
        self.ui.render(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::models::{Movie, SimilarMovies};
    use crate::tconst::Tconst;

    const INCEPTION_URL: &str = "https://www.imdb.com/title/tt1375666/";

    fn inception() -> Movie {
        serde_json::from_str(r#"{"title":"Inception"}"#).unwrap()
    }

    fn two_similar() -> SimilarMovies {
        serde_json::from_str(
            r#"{"all":[
                {"tconst":"tt1","title":"A","poster":"p1","rating":8.5},
                {"tconst":"tt2","title":"B","poster":"p2","rating":7.0}
            ]}"#,
        )
        .unwrap()
    }

    struct FakeMetadata {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl MetadataFetch for FakeMetadata {
        async fn fetch_movie(&self, _tconst: &Tconst) -> Result<Movie, PopupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(PopupError::MalformedResponse("not json".to_string()))
            } else {
                Ok(inception())
            }
        }
    }

    struct FakeSimilarity {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl SimilarityFetch for FakeSimilarity {
        async fn fetch_similar(
            &self,
            _tconst: &Tconst,
            _limit: u32,
        ) -> Result<SimilarMovies, PopupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(PopupError::MalformedResponse("not json".to_string()))
            } else {
                Ok(two_similar())
            }
        }
    }

    /// Records every projected state and quits on the first key request.
    struct RecordingSurface {
        frames: Arc<Mutex<Vec<PopupState>>>,
    }

    impl Surface for RecordingSurface {
        fn render(&mut self, state: &PopupState) -> Result<()> {
            self.frames.lock().unwrap().push(state.clone());
            Ok(())
        }

        fn next_action(&mut self, _state: &PopupState) -> Result<UserAction> {
            Ok(UserAction::Quit)
        }

        fn cleanup(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct Harness {
        metadata_calls: Arc<AtomicUsize>,
        similarity_calls: Arc<AtomicUsize>,
        frames: Arc<Mutex<Vec<PopupState>>>,
        popup: Popup<FakeMetadata, FakeSimilarity, RecordingSurface>,
    }

    fn harness(metadata_fails: bool, similarity_fails: bool) -> Harness {
        let metadata_calls = Arc::new(AtomicUsize::new(0));
        let similarity_calls = Arc::new(AtomicUsize::new(0));
        let frames = Arc::new(Mutex::new(Vec::new()));

        let popup = Popup::new(
            FakeMetadata {
                calls: metadata_calls.clone(),
                fail: metadata_fails,
            },
            FakeSimilarity {
                calls: similarity_calls.clone(),
                fail: similarity_fails,
            },
            RecordingSurface {
                frames: frames.clone(),
            },
            20,
        );

        Harness {
            metadata_calls,
            similarity_calls,
            frames,
            popup,
        }
    }

    #[tokio::test]
    async fn success_renders_content_after_both_fetches() {
        let mut h = harness(false, false);
        h.popup.run(Some(INCEPTION_URL)).await.unwrap();

        assert_eq!(h.metadata_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.similarity_calls.load(Ordering::SeqCst), 1);

        let frames = h.frames.lock().unwrap();
        match frames.last().unwrap() {
            PopupState::Content { movie, similar, .. } => {
                assert_eq!(movie.title, "Inception");
                assert_eq!(similar.all.len(), 2);
                assert_eq!(similar.all[0].title, "A");
                assert_eq!(similar.all[1].title, "B");
            }
            other => panic!("expected content surface, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn loading_is_never_visible_after_a_terminal_surface() {
        let mut h = harness(false, false);
        h.popup.run(Some(INCEPTION_URL)).await.unwrap();

        let frames = h.frames.lock().unwrap();
        let terminal_at = frames
            .iter()
            .position(|s| matches!(s, PopupState::Content { .. } | PopupState::Error))
            .unwrap();
        assert_eq!(terminal_at, frames.len() - 1);
    }

    #[tokio::test]
    async fn bad_page_url_renders_error_without_any_fetch() {
        let mut h = harness(false, false);
        h.popup
            .run(Some("https://www.imdb.com/name/nm0000138/"))
            .await
            .unwrap();

        assert_eq!(h.metadata_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.similarity_calls.load(Ordering::SeqCst), 0);

        let frames = h.frames.lock().unwrap();
        assert!(matches!(frames.last().unwrap(), PopupState::Error));
        assert!(!frames
            .iter()
            .any(|s| matches!(s, PopupState::Content { .. })));
    }

    #[tokio::test]
    async fn missing_page_url_renders_error() {
        let mut h = harness(false, false);
        h.popup.run(None).await.unwrap();

        assert_eq!(h.metadata_calls.load(Ordering::SeqCst), 0);
        let frames = h.frames.lock().unwrap();
        assert!(matches!(frames.last().unwrap(), PopupState::Error));
    }

    #[tokio::test]
    async fn metadata_failure_skips_the_similarity_fetch() {
        let mut h = harness(true, false);
        h.popup.run(Some(INCEPTION_URL)).await.unwrap();

        assert_eq!(h.metadata_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.similarity_calls.load(Ordering::SeqCst), 0);

        let frames = h.frames.lock().unwrap();
        assert!(matches!(frames.last().unwrap(), PopupState::Error));
    }

    #[tokio::test]
    async fn similarity_failure_renders_error() {
        let mut h = harness(false, true);
        h.popup.run(Some(INCEPTION_URL)).await.unwrap();

        assert_eq!(h.similarity_calls.load(Ordering::SeqCst), 1);
        let frames = h.frames.lock().unwrap();
        assert!(matches!(frames.last().unwrap(), PopupState::Error));
        assert!(!frames
            .iter()
            .any(|s| matches!(s, PopupState::Content { .. })));
    }
}

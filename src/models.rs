use serde::Deserialize;

use crate::tconst::imdb_title_url;

/// Base movie info from `GET /movie`. Only `title` is guaranteed by the
/// service; the database backing it stores empty strings for unknown years
/// and runtimes, so those stay plain strings here.
#[derive(Debug, Clone, Deserialize)]
pub struct Movie {
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub runtime: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, rename = "directorNames")]
    pub director_names: Vec<String>,
    #[serde(default, rename = "writerNames")]
    pub writer_names: Vec<String>,
}

/// One recommendation from `GET /similar`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimilarMovie {
    pub tconst: String,
    pub title: String,
    pub poster: String,
    /// 0-10 scale.
    pub rating: f64,
}

impl SimilarMovie {
    pub fn imdb_url(&self) -> String {
        imdb_title_url(&self.tconst)
    }
}

/// The ranked recommendation lists from `GET /similar`. `all` is always
/// present; the two narrower groupings are optional and default to empty.
/// Order within each list is the server's relevance ranking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimilarMovies {
    pub all: Vec<SimilarMovie>,
    #[serde(default)]
    pub directorwriter: Vec<SimilarMovie>,
    #[serde(default)]
    pub genre: Vec<SimilarMovie>,
}

impl SimilarMovies {
    pub fn grouping(&self, grouping: Grouping) -> &[SimilarMovie] {
        match grouping {
            Grouping::All => &self.all,
            Grouping::DirectorWriter => &self.directorwriter,
            Grouping::Genre => &self.genre,
        }
    }
}

/// Which recommendation list the content surface shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    #[default]
    All,
    DirectorWriter,
    Genre,
}

impl Grouping {
    pub fn label(self) -> &'static str {
        match self {
            Grouping::All => "All",
            Grouping::DirectorWriter => "Same Director/Writer",
            Grouping::Genre => "Same Genre",
        }
    }
}

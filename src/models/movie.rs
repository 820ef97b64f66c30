use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A TMDB movie document.
///
/// Only the fields this service reads are named; everything else TMDB
/// returns (credits, videos, similar, genres...) is kept in `extra` and
/// serialized back untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A movie known to the recommendation dataset.
///
/// The set of `movie_id`s in the dataset decides whether a movie can be
/// used as a recommendation seed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MlMovieRef {
    pub movie_id: i64,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MlMovieRef {
    pub fn new(movie_id: i64, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
            extra: Map::new(),
        }
    }
}

/// Dataset movie merged with its TMDB document, when the lookup succeeded
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrichedMovie {
    pub movie_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_data: Option<TmdbMovie>,
}

impl EnrichedMovie {
    /// Dataset-only record, used when TMDB could not be reached for this movie
    pub fn dataset_only(movie: &MlMovieRef) -> Self {
        Self {
            movie_id: movie.movie_id,
            title: movie.title.clone(),
            tmdb_data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tmdb_movie_keeps_unknown_fields() {
        let doc = json!({
            "id": 27205,
            "title": "Inception",
            "poster_path": "/inception.jpg",
            "vote_average": 8.4,
            "overview": "Dreams within dreams",
            "runtime": 148,
            "credits": { "cast": [{ "name": "Leonardo DiCaprio" }] }
        });

        let movie: TmdbMovie = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(movie.id, 27205);
        assert_eq!(movie.title.as_deref(), Some("Inception"));
        assert_eq!(movie.extra["runtime"], 148);

        assert_eq!(serde_json::to_value(&movie).unwrap(), doc);
    }

    #[test]
    fn test_tmdb_movie_tolerates_missing_fields() {
        let movie: TmdbMovie = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(movie.title, None);
        assert_eq!(movie.vote_average, None);
        assert_eq!(serde_json::to_value(&movie).unwrap(), json!({ "id": 1 }));
    }

    #[test]
    fn test_ml_movie_ref_passes_through_extra_fields() {
        let doc = json!({ "movie_id": 19995, "title": "Avatar", "tags": "sci-fi" });
        let movie: MlMovieRef = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(movie.movie_id, 19995);
        assert_eq!(serde_json::to_value(&movie).unwrap(), doc);
    }

    #[test]
    fn test_dataset_only_omits_tmdb_data() {
        let movie = MlMovieRef::new(285, "Pirates of the Caribbean: At World's End");
        let value = serde_json::to_value(EnrichedMovie::dataset_only(&movie)).unwrap();
        assert_eq!(
            value,
            json!({ "movie_id": 285, "title": "Pirates of the Caribbean: At World's End" })
        );
    }
}

//! Genre dimension reconciler

use super::GenreDimension;
use crate::normalize::clean_genre;
use crate::source::GoogleBooksView;

/// Cleaned categories, first occurrence kept when two clean to the same name
pub fn reconcile_genres(gb: &GoogleBooksView<'_>) -> Vec<GenreDimension> {
    let mut genres: Vec<GenreDimension> = Vec::new();

    for genre_name in gb.categories().into_iter().filter_map(|raw| clean_genre(Some(raw))) {
        if !genres.iter().any(|g| g.genre_name == genre_name) {
            genres.push(GenreDimension { genre_name });
        }
    }

    genres
}

//! Publisher dimension reconciler

use super::PublisherDimension;
use crate::normalize::clean_publisher;
use crate::source::GoogleBooksView;

pub fn reconcile_publisher(gb: &GoogleBooksView<'_>) -> Option<PublisherDimension> {
    clean_publisher(gb.publisher()).map(|name| PublisherDimension { name })
}

//! Metrics fact reconciler
//!
//! Every field has exactly one source, so nothing can conflict: ratings,
//! pricing, ebook flag and saleability come from Google Books, the edition
//! count from Open Library.

use super::MetricsFact;
use crate::source::{GoogleBooksView, OpenLibraryView};

pub fn reconcile_metrics(gb: &GoogleBooksView<'_>, ol: &OpenLibraryView<'_>) -> MetricsFact {
    // Currency follows the list price, falling back to the retail price
    let currency_code = gb
        .list_price_currency()
        .or_else(|| gb.retail_price_currency())
        .map(str::to_string);

    MetricsFact {
        rating_avg: gb.average_rating(),
        rating_count: gb.ratings_count(),
        edition_count: ol.edition_count(),
        list_price_amount: gb.list_price_amount(),
        retail_price_amount: gb.retail_price_amount(),
        currency_code,
        is_ebook_available: gb.is_ebook().unwrap_or(false),
        saleability_status: gb.saleability().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceDocument, SourceOrigin};
    use serde_json::json;

    #[test]
    fn test_fields_assigned_per_source() {
        let gb_doc = SourceDocument::new(
            SourceOrigin::GoogleBooks,
            json!({"items": [{
                "volumeInfo": {"averageRating": 4.5, "ratingsCount": 120},
                "saleInfo": {
                    "saleability": "FOR_SALE",
                    "isEbook": true,
                    "retailPrice": {"amount": 7.99, "currencyCode": "EUR"}
                }
            }]}),
        );
        let ol_doc = SourceDocument::new(SourceOrigin::OpenLibrary, json!({"docs": [{"edition_count": 12}]}));

        let metrics = reconcile_metrics(&GoogleBooksView::new(Some(&gb_doc)), &OpenLibraryView::new(Some(&ol_doc)));

        assert_eq!(metrics.rating_avg, Some(4.5));
        assert_eq!(metrics.rating_count, Some(120));
        assert_eq!(metrics.edition_count, Some(12));
        assert_eq!(metrics.list_price_amount, None);
        assert_eq!(metrics.retail_price_amount, Some(7.99));
        assert_eq!(metrics.currency_code.as_deref(), Some("EUR"));
        assert!(metrics.is_ebook_available);
        assert_eq!(metrics.saleability_status.as_deref(), Some("FOR_SALE"));
    }

    #[test]
    fn test_list_price_currency_preferred() {
        let gb_doc = SourceDocument::new(
            SourceOrigin::GoogleBooks,
            json!({"items": [{"saleInfo": {
                "listPrice": {"amount": 10.0, "currencyCode": "USD"},
                "retailPrice": {"amount": 8.0, "currencyCode": "EUR"}
            }}]}),
        );

        let metrics = reconcile_metrics(&GoogleBooksView::new(Some(&gb_doc)), &OpenLibraryView::new(None));

        assert_eq!(metrics.currency_code.as_deref(), Some("USD"));
        assert_eq!(metrics.list_price_amount, Some(10.0));
    }

    #[test]
    fn test_missing_structures_give_defaults() {
        let metrics = reconcile_metrics(&GoogleBooksView::new(None), &OpenLibraryView::new(None));

        assert_eq!(metrics, MetricsFact::default());
        assert!(!metrics.is_ebook_available);
    }
}

use tracing::{info, warn};

use crate::client::{DriveClient, ListQuery};
use crate::model::RemoteEntry;

// Follows the continuation token until the service stops returning one. A
// failed page request ends the scan early; whatever was accumulated up to
// that point is still usable by the caller.
pub fn scan_catalog(client: &DriveClient, query: &ListQuery) -> Vec<RemoteEntry> {
    let mut entries = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = match client.list_page(query, page_token.as_deref()) {
            Ok(page) => page,
            Err(err) => {
                warn!(
                    "catalog scan stopped early after {} entries: {}",
                    entries.len(),
                    err
                );
                break;
            }
        };

        entries.extend(page.files);
        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!("catalog scan collected {} candidate entries", entries.len());
    entries
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::scan_catalog;
    use crate::client::{DriveClient, ListQuery};
    use crate::session::Session;

    fn build_client(base_url: String) -> DriveClient {
        DriveClient::with_base_url(Session::with_access_token("test-token"), base_url)
            .expect("client should build")
    }

    #[test]
    fn scan_follows_pagination_in_order() {
        let mut server = mockito::Server::new();
        let first = server
            .mock("GET", "/files")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "pageSize".into(),
                "2".into(),
            )]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "files": [
                        {"id": "1", "name": "a.jpg", "size": "1"},
                        {"id": "2", "name": "b.png", "size": "2"}
                    ],
                    "nextPageToken": "tok-2"
                }"#,
            )
            .create();
        let second = server
            .mock("GET", "/files")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "pageToken".into(),
                "tok-2".into(),
            )]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"files": [{"id": "3", "name": "c.mp4", "size": "3"}]}"#)
            .create();

        let client = build_client(server.url());
        let entries = scan_catalog(&client, &ListQuery::untyped_binaries(2));

        first.assert();
        second.assert();
        assert_eq!(
            entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "2", "3"]
        );
    }

    #[test]
    fn page_failure_yields_partial_results() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/files")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "pageSize".into(),
                "1".into(),
            )]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "files": [{"id": "1", "name": "a.jpg", "size": "1"}],
                    "nextPageToken": "tok-2"
                }"#,
            )
            .create();
        server
            .mock("GET", "/files")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "pageToken".into(),
                "tok-2".into(),
            )]))
            .with_status(500)
            .with_body("backend error")
            .create();

        let client = build_client(server.url());
        let entries = scan_catalog(&client, &ListQuery::untyped_binaries(1));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "1");
    }

    #[test]
    fn empty_catalog_scans_to_nothing() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/files")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"files": []}"#)
            .create();

        let client = build_client(server.url());
        let entries = scan_catalog(&client, &ListQuery::default());
        assert!(entries.is_empty());
    }
}

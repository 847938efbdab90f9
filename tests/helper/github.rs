//! GitHub API mocks

use mockito::{Matcher, Mock, Server};

/// Mocks the organization listing with `(name, pushed_at)` pairs
pub async fn mock_listing(server: &mut Server, org: &str, repos: &[(&str, &str)]) -> Mock {
    let body = serde_json::Value::Array(
        repos
            .iter()
            .map(|(name, pushed_at)| serde_json::json!({"name": name, "pushed_at": pushed_at}))
            .collect(),
    );

    server
        .mock("GET", format!("/orgs/{}/repos", org).as_str())
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer gh-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

/// Mocks a repository's `api/package.json` lookup and raw download
pub async fn mock_manifest(
    server: &mut Server,
    org: &str,
    repo: &str,
    manifest: serde_json::Value,
) -> (Mock, Mock) {
    let raw_path = format!("/raw/{}/{}/api/package.json", org, repo);
    let download_url = format!("{}{}", server.url(), raw_path);
    let contents = server
        .mock(
            "GET",
            format!("/repos/{}/{}/contents/api/package.json", org, repo).as_str(),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "name": "package.json",
                "path": "api/package.json",
                "download_url": download_url,
            })
            .to_string(),
        )
        .create_async()
        .await;
    let raw = server
        .mock("GET", raw_path.as_str())
        .with_status(200)
        .with_body(manifest.to_string())
        .create_async()
        .await;

    (contents, raw)
}

/// Mocks a repository without `api/package.json`
pub async fn mock_missing_manifest(server: &mut Server, org: &str, repo: &str) -> Mock {
    server
        .mock(
            "GET",
            format!("/repos/{}/{}/contents/api/package.json", org, repo).as_str(),
        )
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Not Found"}"#)
        .create_async()
        .await
}

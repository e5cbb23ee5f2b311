use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::github::{GithubRepoName, Label, PullRequestRecord};

const API_URL: &str = "https://api.github.com";

pub fn user_json(login: &str) -> Value {
    let url = format!("{API_URL}/users/{login}");
    json!({
        "login": login,
        "id": 4539057,
        "node_id": "MDQ6VXNlcjQ1MzkwNTc=",
        "avatar_url": "https://avatars.githubusercontent.com/u/4539057?v=4",
        "gravatar_id": "",
        "url": url,
        "html_url": format!("https://github.com/{login}"),
        "followers_url": format!("{url}/followers"),
        "following_url": format!("{url}/following"),
        "gists_url": format!("{url}/gists"),
        "starred_url": format!("{url}/starred"),
        "subscriptions_url": format!("{url}/subscriptions"),
        "organizations_url": format!("{url}/orgs"),
        "repos_url": format!("{url}/repos"),
        "events_url": format!("{url}/events"),
        "received_events_url": format!("{url}/received_events"),
        "type": "User",
        "site_admin": false,
    })
}

pub fn label_json(name: &str) -> Value {
    json!({
        "id": 1,
        "node_id": "MDU6TGFiZWwx",
        "url": format!("{API_URL}/repos/acme/service/labels/1"),
        "name": name,
        "color": "ededed",
        "description": null,
        "default": false,
    })
}

/// Response of GitHub after an issue comment was created.
pub fn comment_json(issue: u64, body: &str) -> Value {
    json!({
        "id": 1,
        "node_id": "MDEyOklzc3VlQ29tbWVudDE=",
        "url": format!("{API_URL}/repos/acme/service/issues/comments/1"),
        "html_url": format!("https://github.com/acme/service/pull/{issue}#issuecomment-1"),
        "body": body,
        "user": user_json("labelkeeper[bot]"),
        "created_at": "2024-01-01T00:00:00Z",
    })
}

pub fn commit_json(sha: &str, message: &str) -> Value {
    let url = format!("{API_URL}/repos/acme/service/commits/{sha}");
    json!({
        "url": url,
        "sha": sha,
        "node_id": format!("C_{sha}"),
        "html_url": format!("https://github.com/acme/service/commit/{sha}"),
        "comments_url": format!("{url}/comments"),
        "commit": {
            "url": format!("{API_URL}/repos/acme/service/git/commits/{sha}"),
            "author": null,
            "committer": null,
            "message": message,
            "comment_count": 0,
            "tree": {
                "sha": sha,
                "url": format!("{API_URL}/repos/acme/service/git/trees/{sha}"),
            },
        },
        "author": null,
        "committer": null,
        "parents": [],
    })
}

/// A pull request of acme/service opened from a fork, as returned by the REST API.
pub fn pull_request_json(number: u64, created_at: &str, labels: &[&str]) -> Value {
    json!({
        "url": format!("{API_URL}/repos/acme/service/pulls/{number}"),
        "id": number,
        "number": number,
        "state": "open",
        "title": format!("PR #{number}"),
        "created_at": created_at,
        "head": {
            "ref": format!("pr-{number}"),
            "sha": format!("head-{number}"),
            "repo": {
                "id": 2,
                "name": "fork",
                "url": format!("{API_URL}/repos/contributor/fork"),
            },
        },
        "base": {
            "ref": "main",
            "sha": "base",
        },
        "labels": labels.iter().map(|name| label_json(name)).collect::<Vec<_>>(),
    })
}

pub fn pull_request_record(number: u64, created_at: &str, labels: &[&str]) -> PullRequestRecord {
    PullRequestRecord {
        repository: GithubRepoName::new("acme", "service"),
        number: number.into(),
        title: format!("PR #{number}"),
        head_repo: Some("fork".to_string()),
        created_at: created_at.parse::<DateTime<Utc>>().unwrap(),
        labels: labels.iter().map(|name| Label::named(name)).collect(),
    }
}

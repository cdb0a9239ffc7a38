//! Backend client for the encyclopedia API.
//!
//! List endpoints answer either a paginated envelope
//! `{ data, total, limit, offset }` or a bare array; both shapes are
//! accepted and normalized to items plus a total count. Errors are
//! flattened to strings at this boundary and carried into actions.

use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::route::Route;
use crate::state::{
    AbilitySummary, ArticleSummary, CardRecord, ItemSummary, MoveSummary, PokemonSummary, Section,
};

fn client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

/// Either response shape a list endpoint may produce.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Paged {
        data: Vec<T>,
        total: u64,
    },
    Bare(Vec<T>),
}

impl<T> ListBody<T> {
    fn into_parts(self) -> (Vec<T>, u64) {
        match self {
            ListBody::Paged { data, total } => (data, total),
            ListBody::Bare(items) => {
                let total = items.len() as u64;
                (items, total)
            }
        }
    }
}

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = client()
        .get(url)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?
        .error_for_status()
        .map_err(|e| format!("request failed: {e}"))?;
    response
        .json()
        .await
        .map_err(|e| format!("bad response body: {e}"))
}

fn list_url(api_base: &str, section: Section, query: &str) -> String {
    if query.is_empty() {
        format!("{api_base}{}", section.base_path())
    } else {
        format!("{api_base}{}?{query}", section.base_path())
    }
}

async fn fetch_list<T: DeserializeOwned>(
    api_base: &str,
    section: Section,
    query: &str,
) -> Result<(Vec<T>, u64), String> {
    let body: ListBody<T> = get_json(&list_url(api_base, section, query)).await?;
    Ok(body.into_parts())
}

fn wrap<T>(items: Vec<T>, wrap_one: fn(T) -> CardRecord) -> Vec<CardRecord> {
    items.into_iter().map(wrap_one).collect()
}

/// One page (or one search result set) of a section's listing.
pub async fn fetch_records(
    api_base: &str,
    section: Section,
    query: &str,
) -> Result<(Vec<CardRecord>, u64), String> {
    match section {
        Section::Pokemon => {
            let (items, total) = fetch_list::<PokemonSummary>(api_base, section, query).await?;
            Ok((wrap(items, CardRecord::Pokemon), total))
        }
        Section::Moves => {
            let (items, total) = fetch_list::<MoveSummary>(api_base, section, query).await?;
            Ok((wrap(items, CardRecord::Move), total))
        }
        Section::Abilities => {
            let (items, total) = fetch_list::<AbilitySummary>(api_base, section, query).await?;
            Ok((wrap(items, CardRecord::Ability), total))
        }
        Section::Items => {
            let (items, total) = fetch_list::<ItemSummary>(api_base, section, query).await?;
            Ok((wrap(items, CardRecord::Item), total))
        }
        Section::Articles => {
            let (items, total) = fetch_list::<ArticleSummary>(api_base, section, query).await?;
            Ok((wrap(items, CardRecord::Article), total))
        }
    }
}

/// Single record behind a detail route like `/pokemon/25`.
pub async fn fetch_record(api_base: &str, route: &Route) -> Result<CardRecord, String> {
    let section = Section::of_path(&route.path)
        .ok_or_else(|| format!("no section for path {}", route.path))?;
    let url = format!("{api_base}{}", route.path);
    match section {
        Section::Pokemon => Ok(CardRecord::Pokemon(get_json(&url).await?)),
        Section::Moves => Ok(CardRecord::Move(get_json(&url).await?)),
        Section::Abilities => Ok(CardRecord::Ability(get_json(&url).await?)),
        Section::Items => Ok(CardRecord::Item(get_json(&url).await?)),
        Section::Articles => Ok(CardRecord::Article(get_json(&url).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paginated_envelope_parses() {
        let json = r#"{
            "data": [{"id":1,"slug":"pound","name":"Pound","power":40}],
            "total": 900,
            "limit": 24,
            "offset": 0
        }"#;
        let body: ListBody<MoveSummary> = serde_json::from_str(json).unwrap();
        let (items, total) = body.into_parts();
        assert_eq!(items.len(), 1);
        assert_eq!(total, 900);
    }

    #[test]
    fn test_bare_array_parses_with_len_total() {
        let json = r#"[{"id":1,"slug":"stench","name":"Stench"},{"id":2,"slug":"drizzle","name":"Drizzle"}]"#;
        let body: ListBody<AbilitySummary> = serde_json::from_str(json).unwrap();
        let (items, total) = body.into_parts();
        assert_eq!(items.len(), 2);
        assert_eq!(total, 2);
    }

    #[test]
    fn test_list_url() {
        assert_eq!(
            list_url("http://localhost:8080/api", Section::Moves, "limit=24&offset=0"),
            "http://localhost:8080/api/moves?limit=24&offset=0"
        );
        assert_eq!(
            list_url("http://localhost:8080/api", Section::Items, ""),
            "http://localhost:8080/api/items"
        );
    }
}

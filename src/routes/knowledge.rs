//! `/api/knowledge/*` routes: the creator knowledge base.

use crate::knowledge::{self, NewEntry, SearchQuery};
use crate::progress;
use crate::routes::util::{parse_json, request_now, respond};

/// GET /api/knowledge: entries without embeddings.
pub fn handle_list(query: &str) -> String {
    let result = request_now(query, "").map(|now| {
        progress::with_store_mut(now.date(), |store| {
            let key = store.config().storage_keys.knowledge_base.clone();
            knowledge::list(store.storage(), &key)
        })
    });
    respond(result)
}

/// POST /api/knowledge: body: `{"title", "content", "embedding": [..]}`.
pub fn handle_add(query: &str, body: &str) -> String {
    let result = request_now(query, "").and_then(|now| {
        let entry: NewEntry = parse_json(body)?;
        progress::with_store_mut(now.date(), |store| {
            let key = store.config().storage_keys.knowledge_base.clone();
            knowledge::add(store.storage_mut(), &key, entry, now)
        })
    });
    respond(result)
}

/// POST /api/knowledge/search: body: `{"embedding": [..], "topK": 3, "minScore": 0.2}`.
pub fn handle_search(query: &str, body: &str) -> String {
    let result = request_now(query, "").and_then(|now| {
        let search: SearchQuery = parse_json(body)?;
        progress::with_store_mut(now.date(), |store| {
            let key = store.config().storage_keys.knowledge_base.clone();
            knowledge::search(store.storage(), &key, &search)
        })
    });
    respond(result)
}

/// DELETE /api/knowledge/{id}
pub fn handle_delete(id: &str, query: &str) -> String {
    let result = request_now(query, "").and_then(|now| {
        progress::with_store_mut(now.date(), |store| {
            let key = store.config().storage_keys.knowledge_base.clone();
            knowledge::delete(store.storage_mut(), &key, id)
        })
    });
    respond(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::progress::tests::reset;
    use crate::routes::util::envelope;

    #[test]
    fn add_search_delete() {
        reset();
        let a = envelope(&handle_add(
            "?now=2026-10-16T09:00:00",
            r#"{"title":"Audience","content":"Busy parents","embedding":[1.0,0.0]}"#,
        ));
        assert_eq!(a["status"], 200);
        envelope(&handle_add(
            "?now=2026-10-16T09:00:01",
            r#"{"title":"Offer","content":"Meal plan","embedding":[0.0,1.0]}"#,
        ));

        let hits = envelope(&handle_search("", r#"{"embedding":[0.9,0.1],"topK":1}"#));
        let hits = hits["data"].as_array().unwrap().clone();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["title"], "Audience");
        assert!(hits[0].get("embedding").is_none());

        let id = a["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(envelope(&handle_delete(&id, ""))["status"], 200);
        assert_eq!(envelope(&handle_list(""))["data"].as_array().unwrap().len(), 1);
        reset();
    }

    #[test]
    fn mismatched_dimensions() {
        reset();
        envelope(&handle_add("", r#"{"title":"A","content":"a","embedding":[1.0,0.0]}"#));
        let resp = envelope(&handle_search("", r#"{"embedding":[1.0,0.0,0.0]}"#));
        assert_eq!(resp["status"], 400);
        reset();
    }
}

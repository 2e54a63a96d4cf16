//! Small sample tables for the join and window-aggregation tutorials

use serde_json::{json, Value};
use tracing::info;

use crate::core::store::{CollectionKind, DocumentStore, StoreError};

/// (userId, name, active)
const JOIN_USERS: [(u32, &str, bool); 5] = [
    (1, "Abigail", true),
    (2, "Fred", true),
    (3, "Mary", true),
    (4, "Mariah", true),
    (5, "John", false),
];

/// (friendOf, thisUser, type)
const JOIN_RELATIONS: [(u32, u32, &str); 9] = [
    (1, 2, "friend"),
    (1, 3, "friend"),
    (1, 4, "friend"),
    (2, 5, "friend"),
    (2, 2, "friend"),
    (3, 4, "friend"),
    (3, 1, "friend"),
    (4, 1, "friend"),
    (4, 2, "friend"),
];

/// (time, subject, val)
const OBSERVATIONS: [(&str, &str, i64); 9] = [
    ("2021-05-25 07:00:00", "st113", 10),
    ("2021-05-25 07:15:00", "st113", 9),
    ("2021-05-25 07:30:00", "st113", 25),
    ("2021-05-25 07:45:00", "st113", 20),
    ("2021-05-25 07:00:00", "xh458", 0),
    ("2021-05-25 07:15:00", "xh458", 10),
    ("2021-05-25 07:30:00", "xh458", 5),
    ("2021-05-25 07:45:00", "xh458", 30),
    ("2021-05-25 08:00:00", "xh458", 25),
];

/// `users` + `relations` for join queries
pub fn create_join_sample(store: &dyn DocumentStore) -> Result<(), StoreError> {
    store.create_collection("users", CollectionKind::Document)?;
    store.create_collection("relations", CollectionKind::Document)?;

    for (user_id, name, active) in JOIN_USERS {
        store.insert(
            "users",
            json!({
                "_key": name,
                "name": name,
                "active": active,
                "userId": user_id,
            }),
        )?;
    }

    for (friend_of, this_user, kind) in JOIN_RELATIONS {
        store.insert(
            "relations",
            json!({
                "type": kind,
                "friendOf": friend_of,
                "thisUser": this_user,
            }),
        )?;
    }

    info!(
        users = JOIN_USERS.len(),
        relations = JOIN_RELATIONS.len(),
        "created join sample"
    );
    Ok(())
}

/// `observations` time series, inserted as one batch
pub fn create_observations_sample(store: &dyn DocumentStore) -> Result<(), StoreError> {
    store.create_collection("observations", CollectionKind::Document)?;

    let docs: Vec<Value> = OBSERVATIONS
        .into_iter()
        .map(|(time, subject, val)| json!({"time": time, "subject": subject, "val": val}))
        .collect();
    store.insert_many("observations", docs)?;

    info!(observations = OBSERVATIONS.len(), "created observations sample");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::SqliteStore;
    use serde_json::json;

    #[test]
    fn test_join_sample_literal_values() {
        let store = SqliteStore::open_in_memory().unwrap();
        create_join_sample(&store).unwrap();

        let users = store.documents("users").unwrap();
        assert_eq!(users.len(), 5);
        assert_eq!(users[0]["_key"], "Abigail");
        assert_eq!(users[0]["name"], "Abigail");
        assert_eq!(users[0]["active"], true);
        assert_eq!(users[0]["userId"], 1);
        assert_eq!(users[4]["_key"], "John");
        assert_eq!(users[4]["active"], false);
        assert_eq!(users[4]["userId"], 5);

        let relations = store.documents("relations").unwrap();
        assert_eq!(relations.len(), 9);
        let pairs: Vec<(i64, i64)> = relations
            .iter()
            .map(|r| {
                assert_eq!(r["type"], "friend");
                (r["friendOf"].as_i64().unwrap(), r["thisUser"].as_i64().unwrap())
            })
            .collect();
        assert_eq!(
            pairs,
            vec![(1, 2), (1, 3), (1, 4), (2, 5), (2, 2), (3, 4), (3, 1), (4, 1), (4, 2)]
        );
    }

    #[test]
    fn test_join_sample_twice_propagates_failure() {
        let store = SqliteStore::open_in_memory().unwrap();
        create_join_sample(&store).unwrap();
        let err = create_join_sample(&store).unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn test_observations_sample() {
        let store = SqliteStore::open_in_memory().unwrap();
        create_observations_sample(&store).unwrap();

        let docs = store.documents("observations").unwrap();
        assert_eq!(docs.len(), 9);
        assert_eq!(docs[0]["time"], "2021-05-25 07:00:00");
        assert_eq!(docs[0]["subject"], "st113");
        assert_eq!(docs[0]["val"], 10);

        let xh458: Vec<&serde_json::Value> =
            docs.iter().filter(|d| d["subject"] == json!("xh458")).collect();
        assert_eq!(xh458.len(), 5);
        assert_eq!(xh458[4]["time"], "2021-05-25 08:00:00");
        assert_eq!(xh458[4]["val"], 25);
    }
}

//! Browser tests for the JS-facing engine. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use rotation_scorekeeper::ScorekeeperEngine;
use serde_json::Value;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn engine(key: &str) -> ScorekeeperEngine {
    let mut engine = ScorekeeperEngine::with_storage_key(key);
    engine.clear_season().unwrap();
    engine
}

fn json(s: &str) -> Value {
    serde_json::from_str(s).unwrap()
}

#[wasm_bindgen_test]
fn commit_and_undo_through_facade() {
    let mut engine = engine("test-commit-undo");
    engine.commit_rally("opp").unwrap();
    engine.commit_rally("my").unwrap();

    let state = json(&engine.get_state());
    assert_eq!(state["score_my"], 1);
    assert_eq!(state["score_opp"], 1);
    assert_eq!(state["rotation"], 2);
    assert_eq!(state["server"], "my");

    assert!(engine.undo_last());
    let state = json(&engine.get_state());
    assert_eq!(state["rotation"], 1);
    assert_eq!(state["rally_count"], 1);
}

#[wasm_bindgen_test]
fn rejects_unknown_arguments() {
    let mut engine = engine("test-rejects");
    assert!(engine.commit_rally("ref").is_err());
    assert!(engine.set_start_rotation(7).is_err());
    assert!(engine.set_start_mode("float").is_err());
    assert!(engine.get_averages(21).is_err());
    assert!(engine
        .add_set(r#"{"target":25,"laps":2,"extras":0,"ps":[1.5,0,0,0,0,0],"so":[0,0,0,0,0,0]}"#)
        .is_err());
}

#[wasm_bindgen_test]
fn season_survives_new_engine() {
    let mut engine = engine("test-season-persist");
    engine
        .add_set(r#"{"target":25,"laps":2,"extras":1,"ps":[1,0,0,0,0,0],"so":[0,0,0,0,0,0]}"#)
        .unwrap();
    engine
        .add_set(r#"{"target":25,"laps":2,"extras":1,"ps":[0,1,0,0,0,0],"so":[0,0,0,0,0,0]}"#)
        .unwrap();

    let reopened = ScorekeeperEngine::with_storage_key("test-season-persist");
    let averages = json(&reopened.get_averages(25).unwrap());
    assert_eq!(averages["ps"][0], 0.5);
    assert_eq!(averages["ps"][1], 0.5);
    let season = json(&reopened.get_season());
    assert_eq!(season["bank25"]["sets"], 2);
}

#[wasm_bindgen_test]
fn recommends_from_banked_live_set() {
    let mut engine = engine("test-recommend");
    for winner in ["opp", "my", "my", "opp", "my", "my"] {
        engine.commit_rally(winner).unwrap();
    }
    engine.add_current_set(15).unwrap();

    let le = json(&engine.get_avg_laps_extras(15).unwrap());
    assert_eq!(le["laps"], 1);

    let best = json(&engine.best_start(15, "receive", 1, 0).unwrap());
    let totals = json(&engine.rank_starts(15, "receive", 1, 0).unwrap());
    let best_total = best["total"].as_f64().unwrap();
    for total in totals.as_array().unwrap() {
        assert!(best_total >= total.as_f64().unwrap());
    }
}

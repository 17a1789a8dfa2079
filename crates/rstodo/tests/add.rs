mod common;

use common::title_names;

#[test]
fn test_add_sends_only_filled_tasks() {
    let (server, cmd) = test_setup!();
    cmd.login();

    let result = cmd.run(&["add", "Groceries", "Milk", "  ", "Eggs"]);
    result.assert_success();
    assert!(result.stdout().contains("Successfully added!"));

    let state = server.state();
    let body = state.last_add_body.clone().unwrap();
    assert_eq!(body["username"], "ana");
    assert_eq!(body["title"], "Groceries");
    assert_eq!(body["lists"], serde_json::json!(["Milk", "Eggs"]));
    assert_eq!(body["status"], false);
    assert_eq!(state.tasks.len(), 2);
}

#[test]
fn test_blank_title_is_rejected_without_request() {
    let (server, cmd) = test_setup!();
    cmd.login();

    let result = cmd.run(&["add", " ", "Milk"]);
    result.assert_failure();
    assert!(result.stderr().contains("All fields are required!"));
    assert_eq!(server.state().count_requests("POST /add-to-do"), 0);
}

#[test]
fn test_all_blank_tasks_are_rejected_without_request() {
    let (server, cmd) = test_setup!();
    cmd.login();

    let result = cmd.run(&["add", "Groceries", "", " "]);
    result.assert_failure();
    assert!(result.stderr().contains("All fields are required!"));
    assert_eq!(server.state().count_requests("POST /add-to-do"), 0);
}

#[test]
fn test_added_title_shows_as_ongoing() {
    let (_server, cmd) = test_setup!();
    cmd.login();
    cmd.run(&["add", "Groceries", "Milk"]).assert_success();

    let result = cmd.run(&["show"]);
    result.assert_success();
    let board = result.parse_json();
    assert_eq!(title_names(&board, "ongoing"), vec!["Groceries"]);
    assert!(title_names(&board, "completed").is_empty());
}

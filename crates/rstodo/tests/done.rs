mod common;

use common::{done_descs, title_names, title_tasks};

#[test]
fn test_title_completes_after_last_task() {
    let (server, cmd) = test_setup!();
    let (title, ids) = server.seed("Groceries", &["A", "B", "C"]);
    let title = title.to_string();
    let ids: Vec<String> = ids.iter().map(|i| i.to_string()).collect();

    cmd.run(&["done", &title, &ids[2], &ids[0]]).assert_success();
    let board = cmd.run(&["show"]).parse_json();
    assert_eq!(title_names(&board, "ongoing"), vec!["Groceries"]);
    // Checked tasks stay with their title until all of them are done
    assert!(done_descs(&board).is_empty());
    assert_eq!(
        title_tasks(&board, "ongoing", "Groceries"),
        vec![
            ("A".to_string(), true),
            ("B".to_string(), false),
            ("C".to_string(), true),
        ]
    );

    let result = cmd.run(&["done", &title, &ids[1]]);
    result.assert_success();
    assert!(result.stdout().contains("completed"));

    let board = cmd.run(&["show"]).parse_json();
    assert_eq!(title_names(&board, "completed"), vec!["Groceries"]);
    assert!(title_names(&board, "ongoing").is_empty());
    assert_eq!(done_descs(&board), vec!["A", "B", "C"]);
}

#[test]
fn test_undone_reopens_title() {
    let (server, cmd) = test_setup!();
    let (title, ids) = server.seed("Groceries", &["A", "B", "C"]);
    let title = title.to_string();
    let ids: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
    cmd.run(&["done", &title, &ids[0], &ids[1], &ids[2]])
        .assert_success();

    let result = cmd.run(&["undone", &title, &ids[1]]);
    result.assert_success();
    assert!(result.stdout().contains("reopened"));

    // A fresh load files nothing until the title is complete again
    let board = cmd.run(&["show"]).parse_json();
    assert_eq!(title_names(&board, "ongoing"), vec!["Groceries"]);
    assert!(title_names(&board, "completed").is_empty());
    assert!(done_descs(&board).is_empty());

    let lists = cmd.run(&["lists", &title]).parse_json();
    let open: Vec<&str> = lists
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["status"] == false)
        .map(|t| t["list_desc"].as_str().unwrap())
        .collect();
    assert_eq!(open, vec!["B"]);
}

#[test]
fn test_unknown_task_sends_no_update() {
    let (server, cmd) = test_setup!();
    let (title, _) = server.seed("Groceries", &["Milk"]);

    let result = cmd.run(&["done", &title.to_string(), "999"]);
    result.assert_failure();
    assert!(result.stderr().contains("Task not found"));
    assert_eq!(server.state().count_requests("PUT /mark-as-done"), 0);
}

#[test]
fn test_failed_request_is_reported() {
    let (server, cmd) = test_setup!();
    let (title, ids) = server.seed("Groceries", &["Milk"]);
    server.state().failing_tasks.insert(ids[0]);

    let result = cmd.run(&["done", &title.to_string(), &ids[0].to_string()]);
    result.assert_failure();
    assert!(result.stderr().contains("500"));
    assert!(!server.state().task(ids[0]).unwrap().done);
}

//! Command block submission against a mock Q&A service

mod common;

use common::{symbol, MockQaClient};
use pagesmith_editor::{
    BlockId, BlockType, BlockUpdate, ClickModifiers, CommandDelegate, Document, EditSession,
    EditorConfig, EditorError, MentionResolver, NodeType, SessionHandle, FETCH_FAILED, NO_RESPONSE,
};
use std::sync::Arc;
use std::time::Duration;

fn session(body: &str) -> SessionHandle {
    EditSession::new(Document::from_page("page-1", "Title", body), &EditorConfig::default())
        .into_handle()
}

/// Open a command block at `focus` and type `query` into it
fn open_command(session: &SessionHandle, focus: usize, query: &str) -> BlockId {
    let mut s = session.lock();
    s.focus(focus);
    let id = s.open_command_block();
    let index = s.document().position(&id).unwrap();
    s.update_block(index, BlockUpdate::content(query));
    id
}

fn contents(session: &SessionHandle) -> Vec<String> {
    session
        .lock()
        .document()
        .blocks()
        .iter()
        .map(|b| b.content.clone())
        .collect()
}

#[tokio::test]
async fn test_answer_is_inserted_below_command_block() {
    let qa = Arc::new(MockQaClient::answering("line one\r\nline two\n"));
    let delegate = CommandDelegate::new(qa.clone(), "page-1", "repo-abc");
    let session = session("intro\noutro");
    let id = open_command(&session, 2, "  what is this?  ");

    let inserted = delegate.submit(&session, &id).await.unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(
        contents(&session),
        vec!["Title", "intro", "  what is this?  ", "line one", "line two", "outro"]
    );

    let request = qa.last_request().unwrap();
    assert_eq!(request.page_id, "page-1");
    assert_eq!(request.repo_hash, "repo-abc");
    assert!(request.mentioned_definitions.is_empty());
    assert_eq!(
        request.query,
        "<content_above>\nTitle\n\nintro\n</content_above>\n\
         <user_query>\nwhat is this?\n</user_query>\n\
         <response></response>\n\
         <content_below>\noutro\n</content_below>"
    );

    let s = session.lock();
    let state = s.command_state(&id).unwrap();
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.inserted_count, 1);
    assert!(state.last_checkpoint.is_some());
    assert_eq!(s.history().undo_levels(), 1);

    // Inserted answers are persisted, the command block is not
    assert_eq!(s.document().body_markdown(), "intro\nline one\nline two\noutro");
    for block in &s.document().blocks()[3..5] {
        assert_eq!(block.block_type, BlockType::Text);
    }
}

#[tokio::test]
async fn test_empty_query_is_rejected_locally() {
    let qa = Arc::new(MockQaClient::answering("unused"));
    let delegate = CommandDelegate::new(qa.clone(), "page-1", "repo");
    let session = session("a");
    let id = open_command(&session, 1, "   ");

    let err = delegate.submit(&session, &id).await.unwrap_err();

    assert!(matches!(err, EditorError::EmptyQuery));
    assert!(qa.last_request().is_none());
    let s = session.lock();
    let state = s.command_state(&id).unwrap();
    assert_eq!(state.error.as_deref(), Some("Please enter a value"));
    assert!(!state.loading);
}

#[tokio::test]
async fn test_empty_answer_inserts_placeholder() {
    let qa = Arc::new(MockQaClient::answering("  \n"));
    let delegate = CommandDelegate::new(qa, "page-1", "repo");
    let session = session("a");
    let id = open_command(&session, 1, "anything?");

    assert_eq!(delegate.submit(&session, &id).await.unwrap(), 1);
    assert_eq!(contents(&session), vec!["Title", "anything?", NO_RESPONSE, "a"]);
}

#[tokio::test]
async fn test_failure_sets_block_error() {
    let qa = Arc::new(MockQaClient::failing());
    let delegate = CommandDelegate::new(qa, "page-1", "repo");
    let session = session("a");
    let id = open_command(&session, 1, "why?");
    let before = contents(&session);

    let err = delegate.submit(&session, &id).await.unwrap_err();

    assert!(matches!(err, EditorError::Collaborator(_)));
    assert_eq!(contents(&session), before);
    let s = session.lock();
    let state = s.command_state(&id).unwrap();
    assert_eq!(state.error.as_deref(), Some(FETCH_FAILED));
    assert!(!state.loading);
    assert_eq!(state.inserted_count, 0);
    assert!(!s.history().can_undo());
}

#[tokio::test(start_paused = true)]
async fn test_second_submit_while_loading_is_refused() {
    let qa = Arc::new(MockQaClient::answering("done").with_latency(Duration::from_millis(200)));
    let delegate = Arc::new(CommandDelegate::new(qa, "page-1", "repo"));
    let session = session("a");
    let id = open_command(&session, 1, "slow question");

    let first = tokio::spawn({
        let delegate = delegate.clone();
        let session = session.clone();
        let id = id.clone();
        async move { delegate.submit(&session, &id).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(session.lock().command_state(&id).unwrap().loading);

    let err = delegate.submit(&session, &id).await.unwrap_err();
    assert!(matches!(err, EditorError::CommandBusy(_)));

    assert_eq!(first.await.unwrap().unwrap(), 1);
    assert!(!session.lock().command_state(&id).unwrap().loading);
}

#[tokio::test(start_paused = true)]
async fn test_answer_for_closed_block_is_discarded() {
    let qa = Arc::new(MockQaClient::answering("late").with_latency(Duration::from_millis(200)));
    let delegate = Arc::new(CommandDelegate::new(qa, "page-1", "repo"));
    let session = session("a");
    let id = open_command(&session, 1, "question");

    let pending = tokio::spawn({
        let delegate = delegate.clone();
        let session = session.clone();
        let id = id.clone();
        async move { delegate.submit(&session, &id).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(session.lock().close_command_block(&id));

    assert_eq!(pending.await.unwrap().unwrap(), 0);
    assert_eq!(contents(&session), vec!["Title", "a"]);
    assert!(session.lock().command_state(&id).is_none());
}

#[tokio::test]
async fn test_selection_is_sent_as_highlight() {
    let qa = Arc::new(MockQaClient::answering("ok"));
    let delegate = CommandDelegate::new(qa.clone(), "page-1", "repo");
    let session = session("first\nsecond\nthird");

    let id = {
        let mut s = session.lock();
        s.mouse_down(2, ClickModifiers::default());
        s.mouse_enter(3);
        s.mouse_up();
        let id = s.open_command_block();
        assert_eq!(s.document().position(&id), Some(2));
        s.update_block(2, BlockUpdate::content("summarize"));
        id
    };

    delegate.submit(&session, &id).await.unwrap();

    let query = qa.last_request().unwrap().query;
    assert!(query.contains("<highlighted_selection>\nsecond\nthird\n</highlighted_selection>"));
    assert!(!query.contains("<response>"));
}

#[tokio::test]
async fn test_mentions_are_attached_once() {
    let qa = Arc::new(MockQaClient::answering("ok"));
    let resolver = Arc::new(MentionResolver::from_definitions(
        "repo",
        vec![
            symbol(NodeType::Class, "AuthService", "auth/service.py"),
            symbol(NodeType::Function, "login", "auth/views.py"),
        ],
    ));
    let delegate = CommandDelegate::new(qa.clone(), "page-1", "repo").with_mentions(resolver);
    let session = session("see @AuthService for details");
    let id = open_command(&session, 1, "how does @AuthService call @login?");

    delegate.submit(&session, &id).await.unwrap();

    let mentioned = qa.last_request().unwrap().mentioned_definitions;
    let names: Vec<&str> = mentioned.iter().map(|m| m.node_name.as_str()).collect();
    assert_eq!(names, vec!["AuthService", "login"]);
    assert_eq!(mentioned[0].file_name, "auth/service.py");
    assert_eq!(mentioned[0].node_type, NodeType::Class);
}

#[tokio::test]
async fn test_undo_last_insertion() {
    let qa = Arc::new(MockQaClient::answering("x\ny"));
    let delegate = CommandDelegate::new(qa, "page-1", "repo");
    let session = session("a");
    let id = open_command(&session, 1, "q");

    delegate.submit(&session, &id).await.unwrap();
    assert_eq!(contents(&session), vec!["Title", "q", "x", "y", "a"]);

    let mut s = session.lock();
    assert!(s.undo_last_insertion(&id));
    assert_eq!(
        s.document().blocks().iter().map(|b| b.content.as_str()).collect::<Vec<_>>(),
        vec!["Title", "q", "a"]
    );
    let state = s.command_state(&id).unwrap();
    assert_eq!(state.inserted_count, 0);
    assert_eq!(state.last_checkpoint, None);

    assert!(!s.undo_last_insertion(&id));
}

#[tokio::test]
async fn test_undo_last_insertion_after_other_edits_is_noop() {
    let qa = Arc::new(MockQaClient::answering("x"));
    let delegate = CommandDelegate::new(qa, "page-1", "repo");
    let session = session("a");
    let id = open_command(&session, 1, "q");

    delegate.submit(&session, &id).await.unwrap();

    let mut s = session.lock();
    s.insert_block_below(3, BlockType::Text, "later");
    assert!(!s.undo_last_insertion(&id));
    assert_eq!(s.command_state(&id).unwrap().inserted_count, 1);
}

#[tokio::test]
async fn test_submit_rejects_non_command_block() {
    let qa = Arc::new(MockQaClient::answering("x"));
    let delegate = CommandDelegate::new(qa, "page-1", "repo");
    let session = session("a");
    let text_id = session.lock().document().blocks()[1].id.clone();

    let err = delegate.submit(&session, &text_id).await.unwrap_err();
    assert!(matches!(err, EditorError::NotACommandBlock(_)));

    let missing = BlockId::new("nope");
    let err = delegate.submit(&session, &missing).await.unwrap_err();
    assert!(matches!(err, EditorError::BlockNotFound(_)));
}

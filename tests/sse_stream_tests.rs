use pretty_assertions::assert_eq;

use koinonia::client::{ChatRole, Conversation, SseEvent, SseParser, Utf8Decoder};

fn delta_line(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
    )
}

#[test]
fn test_byte_boundaries_never_change_the_events() {
    let mut stream = String::new();
    stream.push_str(": keep-alive\n\n");
    stream.push_str(&delta_line("Grace "));
    stream.push_str(&delta_line("and peace, "));
    stream.push_str(&delta_line("irmão ✝️"));
    stream.push_str("data: [DONE]\n\n");

    let mut whole = SseParser::new();
    let monolithic = whole.push(stream.as_bytes());

    let mut split = SseParser::new();
    let mut one_byte_at_a_time = Vec::new();
    for byte in stream.as_bytes() {
        one_byte_at_a_time.extend(split.push(&[*byte]));
    }

    assert_eq!(
        monolithic,
        vec![
            SseEvent::Delta("Grace ".to_string()),
            SseEvent::Delta("and peace, ".to_string()),
            SseEvent::Delta("irmão ✝️".to_string()),
            SseEvent::Done,
        ]
    );
    assert_eq!(one_byte_at_a_time, monolithic);
}

#[test]
fn test_crlf_lines_parse_like_lf_lines() {
    let mut parser = SseParser::new();
    let stream = delta_line("Hello").replace('\n', "\r\n");

    let events = parser.push(stream.as_bytes());

    assert_eq!(events, vec![SseEvent::Delta("Hello".to_string())]);
}

#[test]
fn test_comments_blanks_and_other_fields_are_ignored() {
    let mut parser = SseParser::new();

    let events = parser.push(b": ping\n\nevent: message\nid: 42\ndata: [DONE]\n");

    assert_eq!(events, vec![SseEvent::Done]);
}

#[test]
fn test_data_prefix_requires_the_space() {
    let mut parser = SseParser::new();

    let events =
        parser.push(b"data:{\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\ndata: [DONE]\n");

    assert_eq!(events, vec![SseEvent::Done]);
}

#[test]
fn test_empty_and_missing_deltas_are_skipped() {
    let mut parser = SseParser::new();
    let mut stream = String::new();
    stream.push_str(&delta_line(""));
    stream.push_str("data: {\"choices\":[{\"delta\":{}}]}\n\n");
    stream.push_str("data: {\"choices\":[]}\n\n");
    stream.push_str(&delta_line("kept"));

    let events = parser.push(stream.as_bytes());

    assert_eq!(events, vec![SseEvent::Delta("kept".to_string())]);
}

#[test]
fn test_nothing_after_done_is_processed() {
    let mut parser = SseParser::new();
    let mut stream = String::from("data: [DONE]\n\n");
    stream.push_str(&delta_line("late"));

    let events = parser.push(stream.as_bytes());

    assert_eq!(events, vec![SseEvent::Done]);
    assert!(parser.is_done());
    assert!(parser.push(delta_line("later").as_bytes()).is_empty());
}

#[test]
fn test_payload_split_mid_json_waits_for_the_newline() {
    let mut parser = SseParser::new();
    let line = delta_line("Hello");
    let (head, tail) = line.split_at(20);

    assert!(parser.push(head.as_bytes()).is_empty());
    assert_eq!(
        parser.push(tail.as_bytes()),
        vec![SseEvent::Delta("Hello".to_string())]
    );
}

#[test]
fn test_unparseable_line_is_held_back() {
    let mut parser = SseParser::new();

    let events = parser.push(b"data: {\"choices\": [{\n");
    assert!(events.is_empty());

    // Later lines queue behind the held one instead of being reordered.
    let events = parser.push(delta_line("next").as_bytes());
    assert!(events.is_empty());
}

#[test]
fn test_decoder_carries_a_split_character() {
    let mut decoder = Utf8Decoder::new();
    let bytes = "✝".as_bytes();

    assert_eq!(decoder.push(&bytes[..2]), "");
    assert_eq!(decoder.push(&bytes[2..]), "✝");
}

#[test]
fn test_decoder_replaces_invalid_bytes() {
    let mut decoder = Utf8Decoder::new();

    assert_eq!(decoder.push(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
}

#[test]
fn test_deltas_fold_into_one_assistant_message() {
    let mut conversation = Conversation::new();
    conversation.push_user("How do I plan a cell meeting?");
    conversation.apply_delta("Start ");
    conversation.apply_delta("with ");
    conversation.apply_delta("prayer.");

    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::User);
    assert_eq!(messages[1].role, ChatRole::Assistant);
    assert_eq!(messages[1].content, "Start with prayer.");
}

#[test]
fn test_finish_closes_the_reply() {
    let mut conversation = Conversation::new();
    conversation.push_user("First question");
    conversation.apply_delta("First answer");
    conversation.finish();
    conversation.push_user("Second question");
    conversation.apply_delta("Second answer");

    assert_eq!(conversation.messages().len(), 4);
    assert_eq!(conversation.last_assistant_text(), Some("Second answer"));
}

#[test]
fn test_pop_last_reverts_a_refused_exchange() {
    let mut conversation = Conversation::new();
    conversation.push_user("kept");
    conversation.finish();
    conversation.push_user("refused");

    let popped = conversation.pop_last().unwrap();

    assert_eq!(popped.role, ChatRole::User);
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].content, "kept");
}

#[test]
fn test_stream_events_drive_the_transcript() {
    let mut parser = SseParser::new();
    let mut conversation = Conversation::new();
    conversation.push_user("Hello");

    let mut stream = String::new();
    stream.push_str(&delta_line("Hi"));
    stream.push_str(&delta_line(", how can I help?"));
    stream.push_str("data: [DONE]\n\n");

    for chunk in stream.as_bytes().chunks(7) {
        for event in parser.push(chunk) {
            match event {
                SseEvent::Delta(text) => conversation.apply_delta(&text),
                SseEvent::Done => conversation.finish(),
            }
        }
    }

    assert!(parser.is_done());
    assert_eq!(
        conversation.last_assistant_text(),
        Some("Hi, how can I help?")
    );
}

use std::io::Write;

/// Raw HTTP handshake written before the first SSE frame. The studio
/// streams over the request's raw writer, so the status line and headers
/// are sent by hand.
pub const SSE_HANDSHAKE: &str = "HTTP/1.1 200 OK\r\n\
                                 Content-Type: text/event-stream\r\n\
                                 Cache-Control: no-cache\r\n\
                                 Connection: keep-alive\r\n\
                                 X-Accel-Buffering: no\r\n\
                                 \r\n";

/// Keep-alive comment frame. SSE comments start with `:` and are ignored
/// by EventSource clients but keep the connection from timing out.
pub const SSE_KEEPALIVE: &str = ": ping\n\n";

/// Formats a named SSE event with a JSON data payload.
pub fn format_event(event_name: &str, json_data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_name, json_data)
}

/// Writes one frame and flushes, returning `false` when the client has
/// disconnected.
pub fn write_frame<W: Write>(writer: &mut W, frame: &str) -> bool {
    writer.write_all(frame.as_bytes()).is_ok() && writer.flush().is_ok()
}

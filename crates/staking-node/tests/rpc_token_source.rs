use staking_core::{Address, ContractReadError, TokenAddressSource};
use staking_node::RpcTokenAddressSource;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves one canned JSON-RPC reply and records the request bodies it saw.
fn start_rpc_server(reply: String) -> (String, Arc<Mutex<Vec<String>>>) {
    use std::io::Read;
    use tiny_http::{Header, Response};
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tiny_http::Server::from_listener(listener, None).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_t = seen.clone();

    std::thread::spawn(move || {
        for mut req in server.incoming_requests() {
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            seen_t.lock().unwrap().push(body);
            let resp = Response::from_string(reply.clone()).with_header(
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
            );
            let _ = req.respond(resp);
        }
    });

    (format!("http://{addr}"), seen)
}

#[test]
fn reads_token_address_with_eth_call() {
    let word = format!("0x{}{}", "00".repeat(12), "70".repeat(20));
    let (url, seen) =
        start_rpc_server(format!(r#"{{"jsonrpc":"2.0","id":1,"result":"{word}"}}"#));
    let source = RpcTokenAddressSource::new(url, Duration::from_secs(5)).unwrap();

    let staking = Address::repeat_byte(0x51);
    let token = source.staking_token(staking).unwrap();
    assert_eq!(token, Address::repeat_byte(0x70));

    let bodies = seen.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let req: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(req["method"], "eth_call");
    assert_eq!(req["params"][0]["to"], format!("0x{}", "51".repeat(20)));
    let data = req["params"][0]["data"].as_str().unwrap();
    assert_eq!(data.len(), 2 + 8);
}

#[test]
fn rpc_error_is_a_protocol_error() {
    let (url, _seen) = start_rpc_server(
        r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#
            .to_string(),
    );
    let source = RpcTokenAddressSource::new(url, Duration::from_secs(5)).unwrap();
    let err = source.staking_token(Address::repeat_byte(0x51)).unwrap_err();
    match err {
        ContractReadError::Protocol(msg) => assert!(msg.contains("execution reverted"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

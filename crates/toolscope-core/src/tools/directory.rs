//! Tool discovery and invocation over an [`RpcClient`]

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{json, Value};

use super::descriptor::{parse_tool_listing, ToolDescriptor};
use crate::codec::{encode_map, parse_arguments_text, NativeMap};
use crate::log_info;
use crate::logging::Logger;
use crate::rpc::{RpcClient, RpcError, RpcResult};

pub const LIST_TOOLS_METHOD: &str = "tools/list";
pub const CALL_TOOL_METHOD: &str = "tools/call";

/// Lists and calls the tools a server exposes
///
/// The last successful listing is cached so a UI can look tools up by name
/// without another round trip.
#[derive(Clone)]
pub struct ToolDirectory {
    client: RpcClient,
    tools: Arc<RwLock<Vec<ToolDescriptor>>>,
}

impl ToolDirectory {
    pub fn new(client: RpcClient) -> Self {
        Self {
            client,
            tools: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    /// Ask the server for its tools
    pub async fn list_tools(&self) -> RpcResult<Vec<ToolDescriptor>> {
        let result = self.client.call(LIST_TOOLS_METHOD, json!({})).await?;
        let tools = parse_tool_listing(&result, self.client.logger().as_ref())?;
        store(&self.tools, self.client.logger().as_ref(), &tools);
        Ok(tools)
    }

    /// Callback form of [`list_tools`](Self::list_tools); returns the request id
    pub fn list_tools_with<F>(&self, callback: F) -> u64
    where
        F: FnOnce(RpcResult<Vec<ToolDescriptor>>) + Send + 'static,
    {
        let cache = self.tools.clone();
        let logger = self.client.logger().clone();
        self.client.call_with(LIST_TOOLS_METHOD, json!({}), move |outcome| {
            let listing = outcome.and_then(|result| parse_tool_listing(&result, logger.as_ref()));
            if let Ok(tools) = &listing {
                store(&cache, logger.as_ref(), tools);
            }
            callback(listing)
        })
    }

    /// Invoke a tool; the result comes back as compact JSON text
    pub async fn call_tool(&self, name: &str, arguments: &NativeMap) -> RpcResult<String> {
        let result = self.client.call(CALL_TOOL_METHOD, call_params(name, arguments)).await?;
        Ok(result.to_string())
    }

    /// Callback form of [`call_tool`](Self::call_tool); returns the request id
    pub fn call_tool_with<F>(&self, name: &str, arguments: &NativeMap, callback: F) -> u64
    where
        F: FnOnce(RpcResult<String>) + Send + 'static,
    {
        self.client
            .call_with(CALL_TOOL_METHOD, call_params(name, arguments), move |outcome| {
                callback(outcome.map(|result| result.to_string()))
            })
    }

    /// Invoke a tool with arguments typed as JSON text
    ///
    /// Text that is not a JSON object fails before anything is sent. Blank
    /// text means no arguments.
    pub async fn call_tool_text(&self, name: &str, arguments: &str) -> RpcResult<String> {
        let arguments =
            parse_arguments_text(arguments).map_err(|e| RpcError::InvalidArguments(e.to_string()))?;
        self.call_tool(name, &arguments).await
    }

    /// Re-list tools, keeping only the count
    pub async fn refresh(&self) -> RpcResult<usize> {
        self.list_tools().await.map(|tools| tools.len())
    }

    /// Tools from the last successful listing
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.tools.read().clone()
    }

    pub fn find(&self, name: &str) -> Option<ToolDescriptor> {
        self.tools.read().iter().find(|t| t.name() == name).cloned()
    }
}

impl std::fmt::Debug for ToolDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDirectory")
            .field("client", &self.client)
            .field("tools", &self.tools.read().len())
            .finish()
    }
}

fn call_params(name: &str, arguments: &NativeMap) -> Value {
    json!({ "name": name, "arguments": encode_map(arguments) })
}

fn store(cache: &RwLock<Vec<ToolDescriptor>>, logger: &dyn Logger, tools: &[ToolDescriptor]) {
    *cache.write() = tools.to_vec();
    log_info!(logger, "[ToolDirectory] Discovered {} tools", tools.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::NativeValue;
    use crate::rpc::{Outbound, DEFAULT_SERVER_URL};
    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    fn sent(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Value {
        match rx.try_recv().expect("a queued frame") {
            Outbound::Text(text) => serde_json::from_str(&text).unwrap(),
            Outbound::Close => panic!("expected a text frame"),
        }
    }

    async fn wait_pending(client: &RpcClient, id: u64) {
        while !client.is_pending(id) {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_list_tools_parses_and_caches() {
        let client = RpcClient::new(DEFAULT_SERVER_URL);
        let mut rx = client.open_for_test();
        let directory = ToolDirectory::new(client.clone());

        let task = tokio::spawn({
            let directory = directory.clone();
            async move { directory.list_tools().await }
        });
        wait_pending(&client, 1).await;

        let request = sent(&mut rx);
        assert_eq!(request["method"], "tools/list");
        assert_eq!(request["params"], json!({}));

        client.handle_text(
            r#"{"jsonrpc":"2.0","id":1,"result":{"tools":[{"name":"x","description":"d","inputSchema":{"properties":{"a":{},"b":{}}}}]}}"#,
        );
        let tools = task.await.unwrap().unwrap();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "x");
        assert_eq!(tools[0].description(), Some("d"));
        assert_eq!(tools[0].input_keys(), ["a", "b"]);
        assert_eq!(directory.tools(), tools);
        assert_eq!(directory.find("x").map(|t| t.name().to_string()), Some("x".to_string()));
        assert!(directory.find("y").is_none());
    }

    #[test]
    fn test_list_tools_with_callback() {
        let client = RpcClient::new(DEFAULT_SERVER_URL);
        let _rx = client.open_for_test();
        let directory = ToolDirectory::new(client.clone());
        let listed: Arc<Mutex<Option<RpcResult<Vec<ToolDescriptor>>>>> = Default::default();

        let id = directory.list_tools_with({
            let listed = listed.clone();
            move |outcome| *listed.lock() = Some(outcome)
        });
        client.handle_text(&format!(r#"{{"id":{},"result":[{{"name":"echo"}}]}}"#, id));

        let tools = listed.lock().take().unwrap().unwrap();
        assert_eq!(tools[0].name(), "echo");
        assert_eq!(directory.tools().len(), 1);
    }

    #[test]
    fn test_failed_listing_keeps_previous_cache() {
        let client = RpcClient::new(DEFAULT_SERVER_URL);
        let _rx = client.open_for_test();
        let directory = ToolDirectory::new(client.clone());
        let listed: Arc<Mutex<Vec<RpcResult<Vec<ToolDescriptor>>>>> = Default::default();

        for _ in 0..2 {
            let listed = listed.clone();
            directory.list_tools_with(move |outcome| listed.lock().push(outcome));
        }
        client.handle_text(r#"{"id":1,"result":{"tools":[{"name":"a"}]}}"#);
        client.handle_text(r#"{"id":2,"result":{"tools":["bad"]}}"#);

        let listed = listed.lock();
        assert!(listed[0].is_ok());
        assert!(matches!(listed[1], Err(RpcError::InvalidResponse(_))));
        assert_eq!(directory.tools()[0].name(), "a");
    }

    #[test]
    fn test_call_tool_envelope_and_result_text() {
        let client = RpcClient::new(DEFAULT_SERVER_URL);
        let mut rx = client.open_for_test();
        let directory = ToolDirectory::new(client.clone());
        let results: Arc<Mutex<Vec<RpcResult<String>>>> = Default::default();

        let mut arguments = NativeMap::new();
        arguments.insert("path", "/tmp/a.txt");
        arguments.insert("limit", 10);
        arguments.insert("tags", NativeValue::List(vec!["x".into(), NativeValue::Null]));

        let id = directory.call_tool_with("read", &arguments, {
            let results = results.clone();
            move |outcome| results.lock().push(outcome)
        });

        let request = sent(&mut rx);
        assert_eq!(request["method"], "tools/call");
        assert_eq!(
            request["params"],
            json!({"name": "read", "arguments": {"path": "/tmp/a.txt", "limit": 10, "tags": ["x", null]}})
        );

        client.handle_text(&format!(
            r#"{{"id":{},"result":{{"content":[{{"type":"text","text":"hi"}}]}}}}"#,
            id
        ));
        assert_eq!(
            *results.lock(),
            vec![Ok(r#"{"content":[{"type":"text","text":"hi"}]}"#.to_string())]
        );
    }

    #[test]
    fn test_call_tool_remote_error() {
        let client = RpcClient::new(DEFAULT_SERVER_URL);
        let _rx = client.open_for_test();
        let directory = ToolDirectory::new(client.clone());
        let results: Arc<Mutex<Vec<RpcResult<String>>>> = Default::default();

        directory.call_tool_with("nope", &NativeMap::new(), {
            let results = results.clone();
            move |outcome| results.lock().push(outcome)
        });
        client.handle_text(r#"{"id":1,"error":{"code":-32601,"message":"Unknown tool"}}"#);

        assert_eq!(
            *results.lock(),
            vec![Err(RpcError::Remote(r#"{"code":-32601,"message":"Unknown tool"}"#.to_string()))]
        );
    }

    #[tokio::test]
    async fn test_call_tool_text_rejects_bad_arguments_before_sending() {
        let client = RpcClient::new(DEFAULT_SERVER_URL);
        let mut rx = client.open_for_test();
        let directory = ToolDirectory::new(client.clone());

        let err = directory.call_tool_text("echo", "{not json").await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidArguments(_)));

        let err = directory.call_tool_text("echo", "[1, 2]").await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidArguments(_)));

        assert!(rx.try_recv().is_err());
        assert_eq!(client.next_request_id(), 1);
    }

    #[tokio::test]
    async fn test_call_tool_text_blank_means_no_arguments() {
        let client = RpcClient::new(DEFAULT_SERVER_URL);
        let mut rx = client.open_for_test();
        let directory = ToolDirectory::new(client.clone());

        let task = tokio::spawn({
            let directory = directory.clone();
            async move { directory.call_tool_text("ping", "   ").await }
        });
        wait_pending(&client, 1).await;

        assert_eq!(sent(&mut rx)["params"], json!({"name": "ping", "arguments": {}}));
        client.handle_text(r#"{"id":1,"result":"pong"}"#);
        assert_eq!(task.await.unwrap().unwrap(), r#""pong""#);
    }

    #[tokio::test]
    async fn test_list_tools_before_open_is_not_connected() {
        let directory = ToolDirectory::new(RpcClient::new(DEFAULT_SERVER_URL));
        assert_eq!(directory.list_tools().await.unwrap_err(), RpcError::NotConnected);
        assert_eq!(directory.refresh().await.unwrap_err(), RpcError::NotConnected);
        assert!(directory.tools().is_empty());
    }
}

//! MessagePack-RPC envelopes.
//!
//! Every message on the channel is a MessagePack array in one of three
//! shapes, distinguished by the leading type tag:
//!
//! - `[0, msgid, method, params]` — request, answered by a correlated response
//! - `[1, msgid, error, result]`  — response, `error` is Nil on success
//! - `[2, method, params]`        — notification, fire-and-forget

use rmpv::Value;
use thiserror::Error;

use crate::rpc::{parse_message_type, RpcMessageType};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    Malformed(&'static str),
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmpv::encode::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[from] rmpv::decode::Error),
    #[error("malformed object registry: {0}")]
    Registry(String),
}

/// A parsed channel message.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Request {
        msgid: u64,
        method: String,
        params: Vec<Value>,
    },
    Response {
        msgid: u64,
        /// Nil on the wire becomes `None`; anything else is a host-reported error.
        error: Option<Value>,
        result: Value,
    },
    Notification {
        method: String,
        params: Vec<Value>,
    },
}

impl Envelope {
    /// Build a request envelope as a wire value.
    pub fn request(msgid: u64, method: &str, params: Vec<Value>) -> Value {
        Value::Array(vec![
            Value::from(RpcMessageType::Request as i64),
            Value::from(msgid),
            Value::from(method),
            Value::Array(params),
        ])
    }

    /// Build a successful response envelope as a wire value.
    pub fn response_ok(msgid: u64, result: Value) -> Value {
        Value::Array(vec![
            Value::from(RpcMessageType::Response as i64),
            Value::from(msgid),
            Value::Nil,
            result,
        ])
    }

    /// Build an error response envelope as a wire value.
    pub fn response_err(msgid: u64, error: &str) -> Value {
        Value::Array(vec![
            Value::from(RpcMessageType::Response as i64),
            Value::from(msgid),
            Value::from(error),
            Value::Nil,
        ])
    }

    /// Build a notification envelope as a wire value.
    pub fn notification(method: &str, params: Vec<Value>) -> Value {
        Value::Array(vec![
            Value::from(RpcMessageType::Notification as i64),
            Value::from(method),
            Value::Array(params),
        ])
    }

    /// Parse a wire value into an envelope.
    ///
    /// Unknown type tags and short arrays are rejected; params that are not
    /// arrays are rejected rather than coerced.
    pub fn parse(value: &Value) -> Result<Self, ProtocolError> {
        let Value::Array(arr) = value else {
            return Err(ProtocolError::Malformed("message is not an array"));
        };
        if arr.is_empty() {
            return Err(ProtocolError::Malformed("message is empty"));
        }
        let msg_type = parse_message_type(&arr[0])
            .ok_or(ProtocolError::Malformed("unknown message type tag"))?;

        match msg_type {
            RpcMessageType::Request => {
                if arr.len() != 4 {
                    return Err(ProtocolError::Malformed("request must have 4 elements"));
                }
                Ok(Self::Request {
                    msgid: parse_msgid(&arr[1])?,
                    method: parse_method(&arr[2])?,
                    params: parse_params(&arr[3])?,
                })
            }
            RpcMessageType::Response => {
                if arr.len() != 4 {
                    return Err(ProtocolError::Malformed("response must have 4 elements"));
                }
                let error = match &arr[2] {
                    Value::Nil => None,
                    other => Some(other.clone()),
                };
                Ok(Self::Response {
                    msgid: parse_msgid(&arr[1])?,
                    error,
                    result: arr[3].clone(),
                })
            }
            RpcMessageType::Notification => {
                if arr.len() != 3 {
                    return Err(ProtocolError::Malformed("notification must have 3 elements"));
                }
                Ok(Self::Notification {
                    method: parse_method(&arr[1])?,
                    params: parse_params(&arr[2])?,
                })
            }
        }
    }
}

fn parse_msgid(val: &Value) -> Result<u64, ProtocolError> {
    val.as_u64()
        .ok_or(ProtocolError::Malformed("msgid is not an unsigned integer"))
}

fn parse_method(val: &Value) -> Result<String, ProtocolError> {
    val.as_str()
        .map(String::from)
        .ok_or(ProtocolError::Malformed("method is not a string"))
}

fn parse_params(val: &Value) -> Result<Vec<Value>, ProtocolError> {
    match val {
        Value::Array(params) => Ok(params.clone()),
        _ => Err(ProtocolError::Malformed("params is not an array")),
    }
}

/// Encode a wire value to MessagePack bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, ProtocolError> {
    let mut bytes = Vec::new();
    rmpv::encode::write_value(&mut bytes, value)?;
    Ok(bytes)
}

/// Decode MessagePack bytes to a wire value.
pub fn decode(bytes: &[u8]) -> Result<Value, ProtocolError> {
    let mut cursor = std::io::Cursor::new(bytes);
    Ok(rmpv::decode::read_value(&mut cursor)?)
}

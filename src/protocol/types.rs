use bytes::{BufMut, Bytes, BytesMut};

/// RESP (REdis Serialization Protocol) value types
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple String: +OK\r\n
    SimpleString(String),
    
    /// Error: -Error message\r\n
    Error(String),
    
    /// Integer: :1000\r\n
    Integer(i64),
    
    /// Bulk String: $6\r\nfoobar\r\n or $-1\r\n for null
    BulkString(Option<Bytes>),
    
    /// Array: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n or *-1\r\n for null
    Array(Option<Vec<RespValue>>),
}

impl RespValue {
    /// Create a simple string response
    pub fn simple_string(s: impl Into<String>) -> Self {
        RespValue::SimpleString(s.into())
    }

    /// Create an error response
    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    /// Create an integer response
    pub fn integer(i: i64) -> Self {
        RespValue::Integer(i)
    }

    /// Create a bulk string response
    pub fn bulk_string(s: impl Into<Bytes>) -> Self {
        RespValue::BulkString(Some(s.into()))
    }

    /// Create a null bulk string response
    pub fn null_bulk_string() -> Self {
        RespValue::BulkString(None)
    }

    /// Create an array response
    pub fn array(arr: Vec<RespValue>) -> Self {
        RespValue::Array(Some(arr))
    }

    /// Create a null array response
    pub fn null_array() -> Self {
        RespValue::Array(None)
    }

    /// Create OK response
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    /// Serialize to RESP format bytes.
    ///
    /// Bulk strings are written as raw bytes, never through a `String`
    /// conversion: values stored by the KV store (and RDB payloads streamed
    /// as bulk strings during `PSYNC`) are not guaranteed to be valid UTF-8.
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.write_into(&mut buf);
        buf.freeze()
    }

    fn write_into(&self, buf: &mut BytesMut) {
        match self {
            RespValue::SimpleString(s) => {
                buf.put_u8(b'+');
                buf.put_slice(s.as_bytes());
                buf.put_slice(b"\r\n");
            }
            RespValue::Error(e) => {
                buf.put_u8(b'-');
                buf.put_slice(e.as_bytes());
                buf.put_slice(b"\r\n");
            }
            RespValue::Integer(i) => {
                buf.put_u8(b':');
                buf.put_slice(i.to_string().as_bytes());
                buf.put_slice(b"\r\n");
            }
            RespValue::BulkString(None) => {
                buf.put_slice(b"$-1\r\n");
            }
            RespValue::BulkString(Some(s)) => {
                buf.put_u8(b'$');
                buf.put_slice(s.len().to_string().as_bytes());
                buf.put_slice(b"\r\n");
                buf.put_slice(s);
                buf.put_slice(b"\r\n");
            }
            RespValue::Array(None) => {
                buf.put_slice(b"*-1\r\n");
            }
            RespValue::Array(Some(arr)) => {
                buf.put_u8(b'*');
                buf.put_slice(arr.len().to_string().as_bytes());
                buf.put_slice(b"\r\n");
                for item in arr {
                    item.write_into(buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_string() {
        let val = RespValue::simple_string("OK");
        assert_eq!(val.serialize(), Bytes::from("+OK\r\n"));
    }

    #[test]
    fn test_error() {
        let val = RespValue::error("Error message");
        assert_eq!(val.serialize(), Bytes::from("-Error message\r\n"));
    }

    #[test]
    fn test_integer() {
        let val = RespValue::integer(1000);
        assert_eq!(val.serialize(), Bytes::from(":1000\r\n"));
    }

    #[test]
    fn test_bulk_string() {
        let val = RespValue::bulk_string("foobar");
        assert_eq!(val.serialize(), Bytes::from("$6\r\nfoobar\r\n"));
    }

    #[test]
    fn test_null_bulk_string() {
        let val = RespValue::null_bulk_string();
        assert_eq!(val.serialize(), Bytes::from("$-1\r\n"));
    }

    #[test]
    fn test_array() {
        let val = RespValue::array(vec![
            RespValue::bulk_string("foo"),
            RespValue::bulk_string("bar"),
        ]);
        assert_eq!(
            val.serialize(),
            Bytes::from("*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n")
        );
    }

    #[test]
    fn test_null_array() {
        let val = RespValue::null_array();
        assert_eq!(val.serialize(), Bytes::from("*-1\r\n"));
    }
}

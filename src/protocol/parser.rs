use super::types::RespValue;
use crate::error::{Result, SlotKvError};
use bytes::{Buf, Bytes, BytesMut};

/// Incremental RESP2 parser. `feed`/`buffer_mut` append bytes read off the
/// socket; `parse` returns `Ok(None)` when the buffer holds an incomplete
/// value rather than erroring, so callers loop `parse()` after every read.
pub struct RespParser {
    buffer: BytesMut,
}

impl RespParser {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buffer
    }

    /// Try to parse one complete RESP value from the buffer.
    pub fn parse(&mut self) -> Result<Option<RespValue>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let mut cursor = std::io::Cursor::new(&self.buffer[..]);
        match self.parse_value(&mut cursor) {
            Ok(value) => {
                let pos = cursor.position() as usize;
                self.buffer.advance(pos);
                Ok(Some(value))
            }
            Err(SlotKvError::Protocol(_)) => Ok(None), // need more data
            Err(e) => Err(e),
        }
    }

    fn parse_value(&self, cursor: &mut std::io::Cursor<&[u8]>) -> Result<RespValue> {
        if cursor.position() >= cursor.get_ref().len() as u64 {
            return Err(SlotKvError::Protocol("incomplete data".to_string()));
        }

        let byte = cursor.get_ref()[cursor.position() as usize];
        cursor.set_position(cursor.position() + 1);

        match byte {
            b'+' => self.parse_simple_string(cursor),
            b'-' => self.parse_error(cursor),
            b':' => self.parse_integer(cursor),
            b'$' => self.parse_bulk_string(cursor),
            b'*' => self.parse_array(cursor),
            _ => Err(SlotKvError::Protocol(format!(
                "invalid RESP type marker: {}",
                byte as char
            ))),
        }
    }

    fn parse_simple_string(&self, cursor: &mut std::io::Cursor<&[u8]>) -> Result<RespValue> {
        let line = self.read_line(cursor)?;
        Ok(RespValue::SimpleString(line))
    }

    fn parse_error(&self, cursor: &mut std::io::Cursor<&[u8]>) -> Result<RespValue> {
        let line = self.read_line(cursor)?;
        Ok(RespValue::Error(line))
    }

    fn parse_integer(&self, cursor: &mut std::io::Cursor<&[u8]>) -> Result<RespValue> {
        let line = self.read_line(cursor)?;
        let num = line
            .parse::<i64>()
            .map_err(|_| SlotKvError::Protocol(format!("invalid integer: {}", line)))?;
        Ok(RespValue::Integer(num))
    }

    fn parse_bulk_string(&self, cursor: &mut std::io::Cursor<&[u8]>) -> Result<RespValue> {
        let line = self.read_line(cursor)?;
        let len = line
            .parse::<i64>()
            .map_err(|_| SlotKvError::Protocol(format!("invalid bulk string length: {}", line)))?;

        if len == -1 {
            return Ok(RespValue::BulkString(None));
        }
        if len < 0 {
            return Err(SlotKvError::Protocol(format!(
                "invalid bulk string length: {}",
                len
            )));
        }

        let len = len as usize;
        let pos = cursor.position() as usize;
        let data = cursor.get_ref();

        if pos + len + 2 > data.len() {
            return Err(SlotKvError::Protocol("incomplete bulk string".to_string()));
        }

        let bytes = Bytes::copy_from_slice(&data[pos..pos + len]);
        cursor.set_position((pos + len + 2) as u64); // skip \r\n

        Ok(RespValue::BulkString(Some(bytes)))
    }

    fn parse_array(&self, cursor: &mut std::io::Cursor<&[u8]>) -> Result<RespValue> {
        let line = self.read_line(cursor)?;
        let len = line
            .parse::<i64>()
            .map_err(|_| SlotKvError::Protocol(format!("invalid array length: {}", line)))?;

        if len == -1 {
            return Ok(RespValue::Array(None));
        }
        if len < 0 {
            return Err(SlotKvError::Protocol(format!("invalid array length: {}", len)));
        }

        let mut array = Vec::with_capacity(len as usize);
        for _ in 0..len {
            array.push(self.parse_value(cursor)?);
        }

        Ok(RespValue::Array(Some(array)))
    }

    fn read_line(&self, cursor: &mut std::io::Cursor<&[u8]>) -> Result<String> {
        let start = cursor.position() as usize;
        let data = cursor.get_ref();
        if data.len() < 2 {
            return Err(SlotKvError::Protocol("incomplete line".to_string()));
        }

        for i in start..data.len() - 1 {
            if data[i] == b'\r' && data[i + 1] == b'\n' {
                let line = String::from_utf8_lossy(&data[start..i]).to_string();
                cursor.set_position((i + 2) as u64);
                return Ok(line);
            }
        }

        Err(SlotKvError::Protocol("incomplete line".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_string() {
        let mut parser = RespParser::new(128);
        parser.feed(b"+OK\r\n");
        assert_eq!(parser.parse().unwrap(), Some(RespValue::SimpleString("OK".to_string())));
    }

    #[test]
    fn parses_error() {
        let mut parser = RespParser::new(128);
        parser.feed(b"-Error message\r\n");
        assert_eq!(
            parser.parse().unwrap(),
            Some(RespValue::Error("Error message".to_string()))
        );
    }

    #[test]
    fn parses_integer() {
        let mut parser = RespParser::new(128);
        parser.feed(b":1000\r\n");
        assert_eq!(parser.parse().unwrap(), Some(RespValue::Integer(1000)));
    }

    #[test]
    fn parses_bulk_string() {
        let mut parser = RespParser::new(128);
        parser.feed(b"$6\r\nfoobar\r\n");
        assert_eq!(
            parser.parse().unwrap(),
            Some(RespValue::BulkString(Some(Bytes::from("foobar"))))
        );
    }

    #[test]
    fn parses_binary_safe_bulk_string() {
        let mut parser = RespParser::new(128);
        let payload: &[u8] = &[0xff, 0x00, 0x80, b'\r', b'\n', 0x01];
        parser.feed(format!("${}\r\n", payload.len()).as_bytes());
        parser.feed(payload);
        parser.feed(b"\r\n");
        assert_eq!(
            parser.parse().unwrap(),
            Some(RespValue::BulkString(Some(Bytes::copy_from_slice(payload))))
        );
    }

    #[test]
    fn parses_null_bulk_string() {
        let mut parser = RespParser::new(128);
        parser.feed(b"$-1\r\n");
        assert_eq!(parser.parse().unwrap(), Some(RespValue::BulkString(None)));
    }

    #[test]
    fn parses_array() {
        let mut parser = RespParser::new(128);
        parser.feed(b"*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n");
        assert_eq!(
            parser.parse().unwrap(),
            Some(RespValue::Array(Some(vec![
                RespValue::BulkString(Some(Bytes::from("foo"))),
                RespValue::BulkString(Some(Bytes::from("bar"))),
            ])))
        );
    }

    #[test]
    fn incomplete_data_yields_none_not_error() {
        let mut parser = RespParser::new(128);
        parser.feed(b"+OK");
        assert_eq!(parser.parse().unwrap(), None);
    }

    #[test]
    fn feeds_across_multiple_reads() {
        let mut parser = RespParser::new(128);
        parser.feed(b"*1\r\n$3\r\nfo");
        assert_eq!(parser.parse().unwrap(), None);
        parser.feed(b"o\r\n");
        assert_eq!(
            parser.parse().unwrap(),
            Some(RespValue::Array(Some(vec![RespValue::BulkString(Some(Bytes::from(
                "foo"
            )))])))
        );
    }
}

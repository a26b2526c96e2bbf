use std::collections::HashMap;

use entsync_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::handshake::{HandshakeRequest, HandshakeResponse};

/// Tag 1000. Client's opening authentication exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHandshake {
    pub id_token: String,
    pub secret: Vec<u8>,
}

impl RequestHandshake {
    pub fn from_request(request: &HandshakeRequest) -> Self {
        Self {
            id_token: request.id_token.clone(),
            secret: request.secret.clone(),
        }
    }
}

impl Serde for RequestHandshake {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_string(&self.id_token)?;
        writer.write_blob(&self.secret)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id_token: reader.read_string()?,
            secret: reader.read_blob()?,
        })
    }
}

/// Tag 1001. Server's verdict on a handshake request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondHandshake {
    pub id_token: String,
    pub authentication_token: String,
    pub allowed: bool,
    pub error: String,
}

impl RespondHandshake {
    pub fn from_response(id_token: &str, response: &HandshakeResponse) -> Self {
        Self {
            id_token: id_token.to_string(),
            authentication_token: response.authentication_token.clone(),
            allowed: response.allowed,
            error: response.error.clone(),
        }
    }
}

impl Serde for RespondHandshake {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_string(&self.id_token)?;
        writer.write_string(&self.authentication_token)?;
        self.allowed.ser(writer)?;
        writer.write_string(&self.error)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id_token: reader.read_string()?,
            authentication_token: reader.read_string()?,
            allowed: bool::de(reader)?,
            error: reader.read_string()?,
        })
    }
}

/// Tag 3000. Remote invocation of a named event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeEvent {
    pub name: String,
    pub args: HashMap<String, Vec<u8>>,
}

impl Serde for InvokeEvent {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_string(&self.name)?;
        self.args.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            name: reader.read_string()?,
            args: HashMap::<String, Vec<u8>>::de(reader)?,
        })
    }
}

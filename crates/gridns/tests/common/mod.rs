// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process mock Name Service speaking the real handshake.

#![allow(dead_code)]

use gridns::codec::wire::NS_LOOKUP_REQID;
use gridns::codec::{decode_packed_int, encode_packed_int, read_frame, write_frame};
use gridns::codec::DEFAULT_MAX_FRAME_SIZE;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

/// Channel id handed out by the mock.
pub const MOCK_CHANNEL: [u8; 2] = [0x03, 0x9A];

/// How the mock answers after the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Answer lookups from the bindings.
    Serve,
    /// Read lookups, never answer.
    Silent,
    /// Answer the first lookup with a negative frame length.
    NegativeFrame,
    /// Reply to CHANNEL_OPEN with a frame too short to hold a channel id.
    ShortChannelReply,
}

pub struct MockNameService {
    port: u16,
}

impl MockNameService {
    pub fn start(bindings: HashMap<String, String>) -> Self {
        Self::with_behavior(bindings, Behavior::Serve)
    }

    pub fn with_behavior(bindings: HashMap<String, String>, behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let bindings = bindings.clone();
                thread::spawn(move || serve(stream, &bindings, behavior));
            }
        });

        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

/// Bindings for a cluster with the given name and optional foreign clusters.
pub fn cluster_bindings(name: &str, foreign: &[(&str, u16)]) -> HashMap<String, String> {
    let mut bindings = HashMap::new();
    bindings.insert(gridns::CLUSTER_NAME.to_string(), name.to_string());
    bindings.insert(
        gridns::CLUSTER_INFO.to_string(),
        format!("Cluster(Name={}, Version=14.1.2)", name),
    );
    bindings.insert(
        gridns::MANAGEMENT_URL.to_string(),
        format!("[http://127.0.0.1:30000/management/coherence/cluster/{}]", name),
    );
    bindings.insert(
        gridns::JMX_URL.to_string(),
        "[service:jmx:rmi://127.0.0.1:9000/jndi/rmi://127.0.0.1:9000/server]".to_string(),
    );
    bindings.insert(
        gridns::METRICS_URL.to_string(),
        "[http://127.0.0.1:9612/metrics, http://127.0.0.1:9613/metrics]".to_string(),
    );
    if !foreign.is_empty() {
        let names: Vec<&str> = foreign.iter().map(|(n, _)| *n).collect();
        bindings.insert(
            gridns::CLUSTER_FOREIGN.to_string(),
            format!("[{}]", names.join(", ")),
        );
        for (foreign_name, port) in foreign {
            bindings.insert(gridns::foreign_local_port(foreign_name), port.to_string());
        }
    }
    bindings
}

fn serve(mut stream: TcpStream, bindings: &HashMap<String, String>, behavior: Behavior) {
    let mut preamble = [0u8; 8];
    if stream.read_exact(&mut preamble).is_err() {
        return;
    }
    if read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE).is_err()
        || read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE).is_err()
    {
        return;
    }

    // Connection ack, ignored by the client.
    if write_frame(&mut stream, &[0x00, 0x01, 0x02, 0x03]).is_err() {
        return;
    }

    let mut channel_reply = vec![0x00, 0x01, 0x00, 0x43, 0x00, 0x01, 0x4E, 0x02];
    if behavior != Behavior::ShortChannelReply {
        channel_reply.extend_from_slice(&MOCK_CHANNEL);
    }
    channel_reply.push(0x40);
    if write_frame(&mut stream, &channel_reply).is_err() {
        return;
    }

    while let Ok(request) = read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE) {
        match behavior {
            Behavior::Silent | Behavior::ShortChannelReply => continue,
            Behavior::NegativeFrame => {
                let _ = stream.write_all(&encode_packed_int(-5));
                continue;
            }
            Behavior::Serve => {}
        }

        let Some(name) = request_name(&request) else {
            return;
        };
        let reply = match bindings.get(&name) {
            Some(value) => value_reply(value),
            None => not_found_reply(),
        };
        if write_frame(&mut stream, &reply).is_err() {
            return;
        }
    }
}

fn request_name(request: &[u8]) -> Option<String> {
    let header = MOCK_CHANNEL.len() + NS_LOOKUP_REQID.len();
    if request.get(..MOCK_CHANNEL.len())? != MOCK_CHANNEL {
        return None;
    }
    let body = request.get(header..)?;
    let (len, continuation) = decode_packed_int(body).ok()?;
    let start = continuation + 1;
    let name = body.get(start..start + usize::try_from(len).ok()?)?;
    String::from_utf8(name.to_vec()).ok()
}

fn value_reply(value: &str) -> Vec<u8> {
    let mut reply = MOCK_CHANNEL.to_vec();
    reply.push(0x01);
    reply.extend_from_slice(&[0x00, 0x42, 0x00, 0x01, 0x4E, 0x02]);
    reply.extend_from_slice(&encode_packed_int(value.len() as i64));
    reply.extend_from_slice(value.as_bytes());
    reply.push(0x40);
    reply
}

fn not_found_reply() -> Vec<u8> {
    let mut reply = MOCK_CHANNEL.to_vec();
    reply.push(0x01);
    reply.extend_from_slice(&[0x00, 0x42, 0x00, 0x01, 0x4E, 0x40]);
    reply
}

//! In-process fake device for integration tests.
//!
//! Serves the LOAD81R protocol over a real TCP socket on localhost, backed
//! by an in-memory tree. Connections are handled one at a time, like the
//! device does.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use load81r_client::SessionConfig;
use serde_json::json;

/// Number of bytes in a screenshot frame.
pub const FRAME_LEN: usize = 320 * 320 * 2;

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

type Tree = Arc<Mutex<BTreeMap<String, Node>>>;

/// A running fake device.
pub struct FakeDevice {
    port: u16,
    tree: Tree,
}

impl FakeDevice {
    /// Start serving an empty tree on an ephemeral port.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake device");
        let port = listener.local_addr().expect("local addr").port();

        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        let tree: Tree = Arc::new(Mutex::new(nodes));

        let served = Arc::clone(&tree);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = serve(stream, &served);
            }
        });

        Self { port, tree }
    }

    /// Session configuration pointing at this device.
    pub fn config(&self) -> SessionConfig {
        SessionConfig::new("127.0.0.1", self.port).with_timeout(Duration::from_secs(5))
    }

    /// Add a directory.
    pub fn with_dir(self, path: &str) -> Self {
        self.tree.lock().unwrap().insert(path.to_string(), Node::Dir);
        self
    }

    /// Add a file.
    pub fn with_file(self, path: &str, data: &[u8]) -> Self {
        self.tree
            .lock()
            .unwrap()
            .insert(path.to_string(), Node::File(data.to_vec()));
        self
    }

    /// Contents of a file, if present.
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        match self.tree.lock().unwrap().get(path) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Whether `path` is a directory.
    pub fn is_dir(&self, path: &str) -> bool {
        matches!(self.tree.lock().unwrap().get(path), Some(Node::Dir))
    }
}

fn parent(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((head, _)) => head,
        None => "/",
    }
}

fn basename(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

fn resolve(cwd: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else if cwd == "/" {
        format!("/{path}")
    } else {
        format!("{cwd}/{path}")
    };
    match joined.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn line(out: &mut TcpStream, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.write_all(b"\n")
}

fn data(out: &mut TcpStream, payload: &[u8]) -> io::Result<()> {
    line(out, &format!("+DATA {}", payload.len()))?;
    out.write_all(payload)?;
    line(out, "+END")
}

fn serve(stream: TcpStream, tree: &Tree) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut out = stream;
    let mut cwd = "/".to_string();

    loop {
        let mut raw = String::new();
        if reader.read_line(&mut raw)? == 0 {
            return Ok(());
        }
        let request = raw.trim_end();
        let (verb, rest) = request.split_once(' ').unwrap_or((request, ""));

        match verb {
            "HELLO" => line(&mut out, "+OK load81r/1.0")?,
            "PWD" => line(&mut out, &format!("+OK {cwd}"))?,
            "PING" => line(&mut out, "+OK pong")?,
            "QUIT" => {
                line(&mut out, "+OK Goodbye")?;
                return Ok(());
            }
            "CD" => {
                let path = resolve(&cwd, rest);
                if matches!(tree.lock().unwrap().get(&path), Some(Node::Dir)) {
                    cwd = path;
                    line(&mut out, "+OK")?;
                } else {
                    line(&mut out, "-ERR No such directory")?;
                }
            }
            "LS" => {
                let path = if rest.is_empty() {
                    cwd.clone()
                } else {
                    resolve(&cwd, rest)
                };
                let nodes = tree.lock().unwrap().clone();
                if !matches!(nodes.get(&path), Some(Node::Dir)) {
                    line(&mut out, "-ERR Cannot open directory")?;
                    continue;
                }
                let entries: Vec<_> = nodes
                    .iter()
                    .filter(|(key, _)| key.as_str() != "/" && parent(key) == path)
                    .map(|(key, node)| match node {
                        Node::File(bytes) => {
                            json!({"name": basename(key), "size": bytes.len(), "is_dir": false})
                        }
                        Node::Dir => json!({"name": basename(key), "size": 0, "is_dir": true}),
                    })
                    .collect();
                data(&mut out, serde_json::to_string(&entries)?.as_bytes())?;
            }
            "CAT" => {
                let found = tree.lock().unwrap().get(&resolve(&cwd, rest)).cloned();
                match found {
                    Some(Node::File(bytes)) => data(&mut out, &bytes)?,
                    _ => line(&mut out, "-ERR File not found")?,
                }
            }
            "STAT" => {
                let path = resolve(&cwd, rest);
                let found = tree.lock().unwrap().get(&path).cloned();
                let record = match found {
                    Some(Node::File(bytes)) => {
                        json!({"name": basename(&path), "size": bytes.len(), "is_dir": false})
                    }
                    Some(Node::Dir) => json!({"name": basename(&path), "size": 0, "is_dir": true}),
                    None => {
                        line(&mut out, "-ERR File not found")?;
                        continue;
                    }
                };
                line(&mut out, &format!("+OK {record}"))?;
            }
            "PUT" => {
                let Some((path, len)) = rest.rsplit_once(' ') else {
                    line(&mut out, "-ERR Usage: PUT path size")?;
                    continue;
                };
                let Ok(len) = len.parse::<usize>() else {
                    line(&mut out, "-ERR Invalid size")?;
                    continue;
                };
                let path = resolve(&cwd, path);
                if !matches!(tree.lock().unwrap().get(parent(&path)), Some(Node::Dir)) {
                    line(&mut out, "-ERR Cannot create file")?;
                    continue;
                }
                line(&mut out, "+READY")?;
                let mut bytes = vec![0u8; len];
                reader.read_exact(&mut bytes)?;
                tree.lock().unwrap().insert(path, Node::File(bytes));
                line(&mut out, "+OK")?;
            }
            "MKDIR" => {
                let path = resolve(&cwd, rest);
                let mut nodes = tree.lock().unwrap();
                if nodes.contains_key(&path) {
                    drop(nodes);
                    line(&mut out, "-ERR File exists")?;
                } else if !matches!(nodes.get(parent(&path)), Some(Node::Dir)) {
                    drop(nodes);
                    line(&mut out, "-ERR No such directory")?;
                } else {
                    nodes.insert(path, Node::Dir);
                    drop(nodes);
                    line(&mut out, "+OK")?;
                }
            }
            "RM" => {
                let path = resolve(&cwd, rest);
                let mut nodes = tree.lock().unwrap();
                let has_children = nodes
                    .keys()
                    .any(|key| key.as_str() != "/" && parent(key) == path);
                let removable = path != "/" && nodes.contains_key(&path) && !has_children;
                if removable {
                    nodes.remove(&path);
                }
                drop(nodes);
                line(&mut out, if removable { "+OK" } else { "-ERR Cannot remove" })?;
            }
            "REPL" => line(&mut out, &format!("+OK => {rest}"))?,
            "SSHOT" => data(&mut out, &vec![0u8; FRAME_LEN])?,
            _ => line(&mut out, "-ERR Unknown command")?,
        }
    }
}

use std::io::{self, Write};
use serde_json::json;

use super::config::{OutputConfig, OutputFormat};
use super::types::Envelope;

pub trait Presenter: Send + Sync {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()>;
}

pub struct JsonPresenter { pub pretty: bool }
impl Presenter for JsonPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        if self.pretty { serde_json::to_writer_pretty(&mut *w, env).map_err(to_io)? } else { serde_json::to_writer(&mut *w, env).map_err(to_io)? }
        writeln!(w)
    }
}

pub struct TextPresenter { pub pretty: bool }
impl Presenter for TextPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        let (label, body) = if env.apply { ("Result", &env.result) } else { ("Plan", &env.plan) };
        writeln!(w, "{}: {}", label, env.op)?;
        if let Some(body) = body {
            if self.pretty { serde_json::to_writer_pretty(&mut *w, body).map_err(to_io)?; } else { serde_json::to_writer(&mut *w, body).map_err(to_io)?; }
            writeln!(w)?;
        }
        Ok(())
    }
}

pub struct McpPresenter { pub pretty: bool }
impl Presenter for McpPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        let (method, key, body) = if env.apply {
            ("notifications/result", "result", &env.result)
        } else {
            ("notifications/plan", "plan", &env.plan)
        };
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": {
                "schema_version": env.schema_version,
                "request_id": env.request_id,
                "op": env.op,
                key: body
            }
        });
        if self.pretty { serde_json::to_writer_pretty(&mut *w, &payload).map_err(to_io)?; } else { serde_json::to_writer(&mut *w, &payload).map_err(to_io)?; }
        writeln!(w)
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_env(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Mcp => Box::new(McpPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { pretty: cfg.pretty }),
        };
        Emitter { presenter }
    }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let mut out = io::stdout();
        self.presenter.emit(env, &mut out)?;
        out.flush()
    }
}

fn to_io(e: serde_json::Error) -> io::Error { io::Error::new(io::ErrorKind::Other, e) }

#[cfg(test)]
mod tests {
    use super::*;

    fn render(p: &dyn Presenter, env: &Envelope) -> String {
        let mut buf: Vec<u8> = Vec::new();
        p.emit(env, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn json_presenter_writes_one_line() {
        let env = Envelope::result("rank", &json!({"articles": []}), None).unwrap();
        let s = render(&JsonPresenter { pretty: false }, &env);
        assert_eq!(s.lines().count(), 1);
        assert!(s.contains("\"op\":\"rank\""));
    }

    #[test]
    fn text_presenter_labels_plan() {
        let env = Envelope::plan("rank", &json!({"feeds": 3}), None).unwrap();
        let s = render(&TextPresenter { pretty: false }, &env);
        assert!(s.starts_with("Plan: rank"));
        assert!(s.contains("\"feeds\":3"));
    }

    #[test]
    fn mcp_presenter_wraps_result() {
        let env = Envelope::result("authority", &json!({"score": 7}), None).unwrap();
        let s = render(&McpPresenter { pretty: false }, &env);
        let v: serde_json::Value = serde_json::from_str(s.trim()).unwrap();
        assert_eq!(v["method"], "notifications/result");
        assert_eq!(v["params"]["result"]["score"], 7);
        assert_eq!(v["params"]["op"], "authority");
    }
}

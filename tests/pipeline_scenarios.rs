use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use slidesnap::render_tree::{Rect, RenderTree};
use slidesnap::{convert, with_session, Error, PageSession, Result, SessionConfig};

/// Session that replays a canned capture instead of driving a browser
struct FakeSession {
    capture: serde_json::Value,
    slow_fonts: bool,
    loaded: Vec<PathBuf>,
}

impl FakeSession {
    fn replaying(tree: &RenderTree) -> Self {
        let json = serde_json::to_string(tree).expect("serialize tree");
        Self {
            capture: serde_json::Value::String(json),
            slow_fonts: false,
            loaded: Vec::new(),
        }
    }
}

impl PageSession for FakeSession {
    fn open(_config: SessionConfig) -> Result<Self> {
        Ok(Self {
            capture: serde_json::Value::Null,
            slow_fonts: false,
            loaded: Vec::new(),
        })
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        self.loaded.push(path.to_path_buf());
        Ok(())
    }

    fn wait_for_fonts(&mut self, timeout: Duration) -> Result<()> {
        if self.slow_fonts {
            return Err(Error::Timeout(timeout.as_millis() as u64));
        }
        Ok(())
    }

    fn wait_for_animations(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    fn evaluate(&mut self, _script: &str) -> Result<serde_json::Value> {
        Ok(self.capture.clone())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("slidesnap-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

const INPUT_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Quarterly review</title>
  <link rel="stylesheet" href="theme.css">
  <style>p { color: rgb(20, 20, 20); }</style>
</head>
<body><div class="slide"><p>Hello</p></div></body>
</html>"#;

fn simple_page() -> RenderTree {
    let mut b = RenderTree::builder(Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let root = b.root();
    let slide = b.element(root, "div", Rect::new(0.0, 0.0, 1920.0, 1080.0));
    b.attr(slide, "class", "slide")
        .style(slide, "background-color", "rgb(12, 34, 56)")
        .style(slide, "padding-top", "40px")
        .style(slide, "padding-left", "80px");
    let p = b.element(slide, "p", Rect::new(80.0, 40.0, 600.0, 48.0));
    b.style(p, "color", "rgb(20, 20, 20)").style(p, "font-size", "32px");
    b.text(p, "Hello");
    b.build()
}

#[test]
fn simple_page_is_converted() {
    let dir = scratch("simple");
    let input = dir.join("slide.html");
    let output = dir.join("slide.out.html");
    fs::write(&input, INPUT_HTML).unwrap();

    let mut session = FakeSession::replaying(&simple_page());
    let snapshot = convert(&mut session, &input, &output, &SessionConfig::default()).unwrap();

    assert_eq!(session.loaded, vec![input.clone()]);
    assert_eq!(snapshot.units.len(), 1);
    assert_eq!(snapshot.units[0].tag_name, "p");

    let doc = fs::read_to_string(&output).unwrap();
    assert!(doc.starts_with("<!DOCTYPE html>"));
    assert!(doc.contains("<title>Quarterly review</title>"));
    assert!(doc.contains("theme.css"));
    assert!(doc.contains("background: rgb(12, 34, 56);"));
    assert!(doc.contains("padding: 40px 0px 0px 80px;"));
    assert!(doc.contains(">Hello</p>"));
    // Positions are relative to the container's padding box
    assert!(doc.contains("left: 0px; top: 0px; width: 600px; height: 48px"));
    assert!(!dir.join("slide.out.html.tmp").exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn framed_image_takes_the_frame_box() {
    let mut b = RenderTree::builder(Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let root = b.root();
    let frame = b.element(root, "div", Rect::new(100.0, 100.0, 400.0, 300.0));
    b.attr(frame, "class", "image-container rounded");
    let img = b.element(frame, "img", Rect::new(120.0, 120.0, 200.0, 150.0));
    b.attr(img, "src", "chart.png").attr(img, "alt", "Chart");
    let h1 = b.element(root, "h1", Rect::new(600.0, 100.0, 800.0, 80.0));
    b.text(h1, "Revenue");
    let tree = b.build();

    let dir = scratch("image");
    let input = dir.join("in.html");
    let output = dir.join("out.html");
    fs::write(&input, "<html><body></body></html>").unwrap();

    let mut session = FakeSession::replaying(&tree);
    let snapshot = convert(&mut session, &input, &output, &SessionConfig::default()).unwrap();

    let image = snapshot
        .units
        .iter()
        .find(|u| u.tag_name == "img")
        .expect("image unit");
    assert!(image.is_image_with_container);
    assert_eq!(image.bounding_box, Rect::new(100.0, 100.0, 400.0, 300.0));
    assert!(snapshot.units.iter().all(|u| u.node != frame));

    let doc = fs::read_to_string(&output).unwrap();
    assert!(doc.contains("src=\"chart.png\""));
    assert!(doc.contains("left: 100px; top: 100px; width: 400px; height: 300px"));
    assert!(doc.contains("object-fit: cover\" />"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn empty_page_writes_nothing() {
    let mut b = RenderTree::builder(Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let root = b.root();
    b.element(root, "div", Rect::new(10.0, 10.0, 200.0, 200.0));
    let tree = b.build();

    let dir = scratch("empty");
    let input = dir.join("in.html");
    let output = dir.join("out.html");
    fs::write(&input, "<html><body><div></div></body></html>").unwrap();

    let mut session = FakeSession::replaying(&tree);
    let res = convert(&mut session, &input, &output, &SessionConfig::default());
    assert!(matches!(res, Err(Error::NoVisibleUnits)));
    assert!(!output.exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn malformed_capture_is_reported() {
    let dir = scratch("malformed");
    let input = dir.join("in.html");
    let output = dir.join("out.html");
    fs::write(&input, "<html></html>").unwrap();

    let mut session = FakeSession::replaying(&simple_page());
    session.capture = serde_json::json!({"nodes": "not a list"});
    let res = convert(&mut session, &input, &output, &SessionConfig::default());
    assert!(matches!(res, Err(Error::Capture(_))));
    assert!(!output.exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = scratch("missing");
    let mut session = FakeSession::replaying(&simple_page());
    let res = convert(
        &mut session,
        &dir.join("nope.html"),
        &dir.join("out.html"),
        &SessionConfig::default(),
    );
    assert!(matches!(res, Err(Error::Io { .. })));
    assert!(session.loaded.is_empty());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn slow_fonts_do_not_stop_conversion() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = scratch("fonts");
    let input = dir.join("in.html");
    let output = dir.join("out.html");
    fs::write(&input, INPUT_HTML).unwrap();

    let mut session = FakeSession::replaying(&simple_page());
    session.slow_fonts = true;
    let config = SessionConfig {
        font_timeout_ms: 10,
        ..SessionConfig::default()
    };
    assert!(convert(&mut session, &input, &output, &config).is_ok());
    assert!(output.exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn scoped_session_propagates_pipeline_errors() {
    let res: Result<()> = with_session::<FakeSession, _, _>(SessionConfig::default(), |session| {
        // An opened fake has nothing to replay
        let value = session.evaluate("capture")?;
        RenderTree::from_capture(value).map(|_| ())
    });
    assert!(matches!(res, Err(Error::Capture(_))));
}

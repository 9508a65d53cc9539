//! End-to-end resolution against in-memory document sources.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use streamline_include::{
    DocumentSource, EmptyDocumentPolicy, Error, Evaluator, FetchResponse, MemorySource,
    ResolvedValue, evaluate_document,
};
use streamline_source::SourceResult;
use tokio::sync::Barrier;

const BASE: &str = "/hacsfiles/streamline-card/";

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

fn to_json(value: &ResolvedValue) -> String {
    serde_json::to_string(value).unwrap()
}

#[tokio::test]
async fn test_include_one() {
    let source = MemorySource::new().with_document(url("a.yaml"), "x: 1\ny: [a, b]");
    let value = evaluate_document("root: !include-one a.yaml", BASE, Arc::new(source))
        .await
        .unwrap();
    assert_eq!(to_json(&value), r#"{"root":{"x":1,"y":["a","b"]}}"#);
}

#[tokio::test]
async fn test_include_alias() {
    let source = MemorySource::new().with_document(url("a.yaml"), "x: 1");
    let value = evaluate_document("- !include a.yaml\n- 2", BASE, Arc::new(source))
        .await
        .unwrap();
    assert_eq!(to_json(&value), r#"[{"x":1},2]"#);
}

#[tokio::test]
async fn test_nested_include_resolves_against_its_own_directory() {
    let source = Arc::new(
        MemorySource::new()
            .with_document(url("cards/outer.yaml"), "inner: !include-one parts/inner.yaml")
            .with_document(url("cards/parts/inner.yaml"), "leaf: true"),
    );
    let evaluator = Evaluator::new(source.clone());
    let value = evaluator
        .evaluate_document("card: !include-one cards/outer.yaml", BASE)
        .await
        .unwrap();

    assert_eq!(to_json(&value), r#"{"card":{"inner":{"leaf":true}}}"#);
    assert_eq!(
        source.requests(),
        vec![url("cards/outer.yaml"), url("cards/parts/inner.yaml")]
    );
}

#[tokio::test]
async fn test_include_dir_named() {
    let source = MemorySource::new()
        .with_document(url("pkgs/manifest.json"), r#"["one.yaml", "two.yml"]"#)
        .with_document(url("pkgs/one.yaml"), "a: 1")
        .with_document(url("pkgs/two.yml"), "b: 2");
    let value = evaluate_document("templates: !include-dir-named pkgs", BASE, Arc::new(source))
        .await
        .unwrap();

    let templates = value.get("templates").unwrap();
    assert_eq!(templates.keys(), vec!["one", "two"]);
    assert_eq!(to_json(&value), r#"{"templates":{"one":{"a":1},"two":{"b":2}}}"#);
}

#[tokio::test]
async fn test_include_dir_named_keeps_manifest_order() {
    let source = MemorySource::new()
        .with_document(url("pkgs/manifest.json"), r#"["zeta.yaml", "alpha.yaml", "mid.yaml"]"#)
        .with_document(url("pkgs/zeta.yaml"), "z")
        .with_document(url("pkgs/alpha.yaml"), "a")
        .with_document(url("pkgs/mid.yaml"), "m");
    let value = evaluate_document("!include_dir_named pkgs/", BASE, Arc::new(source))
        .await
        .unwrap();
    assert_eq!(value.keys(), vec!["zeta", "alpha", "mid"]);
}

#[tokio::test]
async fn test_missing_manifest_fails() {
    let result = evaluate_document(
        "t: !include-dir-named nowhere",
        BASE,
        Arc::new(MemorySource::new()),
    )
    .await;
    match result {
        Err(Error::Manifest { url: manifest, .. }) => {
            assert_eq!(manifest, url("nowhere/manifest.json"));
        }
        other => panic!("expected manifest error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_manifest_fails() {
    let source = MemorySource::new().with_document(url("pkgs/manifest.json"), r#"{"a": 1}"#);
    let result = evaluate_document("t: !include-dir-named pkgs", BASE, Arc::new(source)).await;
    assert!(matches!(result, Err(Error::Manifest { .. })));
}

#[tokio::test]
async fn test_failing_directory_member_fails_whole_directive() {
    let source = Arc::new(
        MemorySource::new()
            .with_document(url("pkgs/manifest.json"), r#"["ok.yaml", "missing.yaml"]"#)
            .with_document(url("pkgs/ok.yaml"), "k: 1"),
    );
    let result = evaluate_document(
        "title: Home\ntemplates: !include-dir-named pkgs",
        BASE,
        source.clone(),
    )
    .await;

    match result {
        Err(Error::Fetch { url: failed, status, .. }) => {
            assert_eq!(failed, url("pkgs/missing.yaml"));
            assert_eq!(status, 404);
        }
        other => panic!("expected fetch error, got {:?}", other),
    }
    assert!(source.requests().contains(&url("pkgs/ok.yaml")));
}

#[tokio::test]
async fn test_empty_document_is_empty_mapping() {
    let source = MemorySource::new().with_document(url("empty.yaml"), "  \n");
    let value = evaluate_document("e: !include-one empty.yaml", BASE, Arc::new(source))
        .await
        .unwrap();
    assert_eq!(to_json(&value), r#"{"e":{}}"#);
}

#[tokio::test]
async fn test_empty_document_rejected_when_configured() {
    let source = MemorySource::new().with_document(url("empty.yaml"), "");
    let evaluator = Evaluator::builder(Arc::new(source))
        .empty_document(EmptyDocumentPolicy::Reject)
        .build();
    let result = evaluator
        .evaluate_document("e: !include-one empty.yaml", BASE)
        .await;
    assert!(matches!(result, Err(Error::EmptyDocument { .. })));
}

#[tokio::test]
async fn test_status_zero_is_tolerated() {
    let source = MemorySource::new()
        .with_response(url("opaque.yaml"), FetchResponse::new(0, "", "k: v"))
        .with_response(url("blank.yaml"), FetchResponse::new(0, "", ""));
    let value = evaluate_document(
        "a: !include opaque.yaml\nb: !include blank.yaml",
        BASE,
        Arc::new(source),
    )
    .await
    .unwrap();
    assert_eq!(to_json(&value), r#"{"a":{"k":"v"},"b":{}}"#);
}

#[tokio::test]
async fn test_missing_document_fails_with_status() {
    let result = evaluate_document(
        "a: !include-one missing.yaml",
        BASE,
        Arc::new(MemorySource::new()),
    )
    .await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Fetch { status: 404, .. }));
    assert_eq!(
        err.to_string(),
        format!("Failed to fetch {}: 404 Not Found", url("missing.yaml"))
    );
}

#[tokio::test]
async fn test_error_in_nested_include_propagates() {
    let source = MemorySource::new().with_document(url("outer.yaml"), "x: !include-one gone.yaml");
    let result = evaluate_document("a: !include-one outer.yaml", BASE, Arc::new(source)).await;
    match result {
        Err(Error::Fetch { url: failed, .. }) => assert_eq!(failed, url("gone.yaml")),
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_directive_fails_whole_call() {
    let source = MemorySource::new().with_document(url("a.yaml"), "x: !vault key");
    let result = evaluate_document("a: !include a.yaml\nb: 2", BASE, Arc::new(source)).await;
    match result {
        Err(Error::UnknownDirective { name, location }) => {
            assert_eq!(name, "vault");
            assert_eq!(location.file.as_deref(), Some(url("a.yaml").as_str()));
        }
        other => panic!("expected unknown directive, got {:?}", other),
    }
}

#[tokio::test]
async fn test_parse_error_names_included_url() {
    let source = MemorySource::new().with_document(url("bad.yaml"), "a: [1, 2");
    let result = evaluate_document("x: !include bad.yaml", BASE, Arc::new(source)).await;
    match result {
        Err(Error::Parse { url: Some(failed), .. }) => assert_eq!(failed, url("bad.yaml")),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_directive_free_document_is_translated() {
    let value = evaluate_document(
        "type: entities\nshow_header: false\nentities:\n  - light.kitchen\n  - entity: sensor.temp\n    name: ~",
        BASE,
        Arc::new(MemorySource::new()),
    )
    .await
    .unwrap();
    assert_eq!(
        to_json(&value),
        r#"{"type":"entities","show_header":false,"entities":["light.kitchen",{"entity":"sensor.temp","name":null}]}"#
    );
}

#[tokio::test]
async fn test_resolving_output_again_is_identity() {
    let source = MemorySource::new().with_document(url("a.yaml"), "x: [1, {y: 2}]");
    let evaluator = Evaluator::new(Arc::new(source));
    let first = evaluator
        .evaluate_document("a: !include a.yaml", BASE)
        .await
        .unwrap();
    let second = evaluator.resolve(&first, BASE).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_evaluate_url() {
    let source = MemorySource::new()
        .with_document(url("dashboard.yaml"), "card: !include cards/c.yaml")
        .with_document(url("cards/c.yaml"), "type: button");
    let evaluator = Evaluator::new(Arc::new(source));
    let value = evaluator.evaluate_url(&url("dashboard.yaml")).await.unwrap();
    assert_eq!(to_json(&value), r#"{"card":{"type":"button"}}"#);
}

#[tokio::test]
async fn test_cycle_is_detected() {
    let source = MemorySource::new()
        .with_document(url("a.yaml"), "b: !include b.yaml")
        .with_document(url("b.yaml"), "a: !include a.yaml");
    let result = evaluate_document("root: !include a.yaml", BASE, Arc::new(source)).await;
    match result {
        Err(Error::Cycle { url: repeated, chain }) => {
            assert_eq!(repeated, url("a.yaml"));
            assert_eq!(chain, vec![url("a.yaml"), url("b.yaml"), url("a.yaml")]);
        }
        other => panic!("expected cycle, got {:?}", other),
    }
}

#[tokio::test]
async fn test_diamond_is_not_a_cycle() {
    let source = Arc::new(
        MemorySource::new()
            .with_document(url("left.yaml"), "shared: !include shared.yaml")
            .with_document(url("right.yaml"), "shared: !include shared.yaml")
            .with_document(url("shared.yaml"), "v: 1"),
    );
    let value = evaluate_document(
        "l: !include left.yaml\nr: !include right.yaml",
        BASE,
        source.clone(),
    )
    .await
    .unwrap();
    assert_eq!(
        to_json(&value),
        r#"{"l":{"shared":{"v":1}},"r":{"shared":{"v":1}}}"#
    );
    // No caching: each include fetches.
    assert_eq!(
        source
            .requests()
            .iter()
            .filter(|u| **u == url("shared.yaml"))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_self_include_hits_depth_limit_without_cycle_detection() {
    let source = MemorySource::new().with_document(url("loop.yaml"), "again: !include loop.yaml");
    let evaluator = Evaluator::builder(Arc::new(source))
        .detect_cycles(false)
        .max_include_depth(5)
        .build();
    let result = evaluator.evaluate_document("!include loop.yaml", BASE).await;
    assert!(matches!(
        result,
        Err(Error::IncludeTooDeep { max_depth: 5, .. })
    ));
}

#[tokio::test]
async fn test_custom_manifest_name() {
    let source = MemorySource::new()
        .with_document(url("pkgs/index.json"), r#"["a.yaml"]"#)
        .with_document(url("pkgs/a.yaml"), "k: 1");
    let evaluator = Evaluator::builder(Arc::new(source))
        .manifest_name("index.json")
        .build();
    let value = evaluator
        .evaluate_document("!include-dir-named pkgs", BASE)
        .await
        .unwrap();
    assert_eq!(to_json(&value), r#"{"a":{"k":1}}"#);
}

/// Holds each `.yaml` fetch until the barrier's party count is in flight at
/// once. Manifests pass straight through.
struct RendezvousSource {
    barrier: Barrier,
    inner: MemorySource,
}

#[async_trait]
impl DocumentSource for RendezvousSource {
    async fn fetch(&self, url: &str) -> SourceResult<FetchResponse> {
        if url.ends_with(".yaml") {
            self.barrier.wait().await;
        }
        self.inner.fetch(url).await
    }

    fn name(&self) -> &'static str {
        "rendezvous"
    }
}

#[tokio::test]
async fn test_sibling_includes_are_fetched_concurrently() {
    let source = RendezvousSource {
        barrier: Barrier::new(3),
        inner: MemorySource::new()
            .with_document(url("a.yaml"), "1")
            .with_document(url("b.yaml"), "2")
            .with_document(url("c.yaml"), "3"),
    };
    let evaluator = Evaluator::new(Arc::new(source));
    let resolution = evaluator.evaluate_document(
        "x: !include a.yaml\ny: [!include b.yaml, !include c.yaml]",
        BASE,
    );

    // Sequential fetching would never get past the barrier.
    let value = tokio::time::timeout(Duration::from_secs(5), resolution)
        .await
        .expect("sibling includes were not fetched concurrently")
        .unwrap();
    assert_eq!(to_json(&value), r#"{"x":1,"y":[2,3]}"#);
}

#[tokio::test]
async fn test_directory_members_are_fetched_concurrently() {
    let source = RendezvousSource {
        barrier: Barrier::new(3),
        inner: MemorySource::new()
            .with_document(url("pkgs/manifest.json"), r#"["a.yaml", "b.yaml", "c.yaml"]"#)
            .with_document(url("pkgs/a.yaml"), "1")
            .with_document(url("pkgs/b.yaml"), "2")
            .with_document(url("pkgs/c.yaml"), "3"),
    };
    let evaluator = Evaluator::new(Arc::new(source));
    let resolution = evaluator.evaluate_document("!include-dir-named pkgs", BASE);

    let value = tokio::time::timeout(Duration::from_secs(5), resolution)
        .await
        .expect("directory members were not fetched concurrently")
        .unwrap();
    assert_eq!(to_json(&value), r#"{"a":1,"b":2,"c":3}"#);
}

/// Never answers for `/hang` URLs; delegates everything else.
struct HangingSource {
    inner: MemorySource,
}

#[async_trait]
impl DocumentSource for HangingSource {
    async fn fetch(&self, url: &str) -> SourceResult<FetchResponse> {
        if url.ends_with("hang.yaml") {
            std::future::pending::<()>().await;
        }
        self.inner.fetch(url).await
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

#[tokio::test]
async fn test_first_failure_does_not_wait_for_pending_siblings() {
    let source = HangingSource {
        inner: MemorySource::new(),
    };
    let evaluator = Evaluator::new(Arc::new(source));
    let resolution = evaluator.evaluate_document(
        "slow: !include hang.yaml\nbroken: !include missing.yaml",
        BASE,
    );

    let result = tokio::time::timeout(Duration::from_secs(5), resolution)
        .await
        .expect("resolution waited on a pending sibling");
    assert!(matches!(result, Err(Error::Fetch { status: 404, .. })));
}

#[tokio::test]
async fn test_dashboard_snapshot() {
    let source = MemorySource::new()
        .with_document(
            url("templates/manifest.json"),
            r#"["header.yaml", "light_card.yaml"]"#,
        )
        .with_document(url("templates/header.yaml"), "card:\n  type: markdown\n  content: '# Home'")
        .with_document(
            url("templates/light_card.yaml"),
            "default:\n  - icon: mdi:lightbulb\ncard: !include-one parts/tile.yaml",
        )
        .with_document(url("templates/parts/tile.yaml"), "type: tile\nstate_content: [state, last_changed]");

    let value = evaluate_document(
        "title: Home\nstreamline_templates: !include-dir-named templates\nviews: []",
        BASE,
        Arc::new(source),
    )
    .await
    .unwrap();

    let json = serde_json::to_string_pretty(&value).unwrap();
    insta::assert_snapshot!(json, @r##"
    {
      "title": "Home",
      "streamline_templates": {
        "header": {
          "card": {
            "type": "markdown",
            "content": "# Home"
          }
        },
        "light_card": {
          "default": [
            {
              "icon": "mdi:lightbulb"
            }
          ],
          "card": {
            "type": "tile",
            "state_content": [
              "state",
              "last_changed"
            ]
          }
        }
      },
      "views": []
    }
    "##);
}

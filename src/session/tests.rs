// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::time::Duration;

use rstest::{fixture, rstest};

use super::{sync_mapping, Workspace};
use crate::config::VaultConfig;
use crate::error::VaultError;
use crate::mapping::MappingIndex;
use crate::model::element::NODE_ID_KEY;
use crate::model::fixtures::{chain_abc, eid, rect};
use crate::model::{
    DiagramFile, EdgeId, EdgeType, EnhancementOptions, FileId, NodeId, NodeType, VersionType,
};
use crate::ops::{ApplyError, ShadowOp};
use crate::store::MemoryBackend;
use crate::version::NewFileParams;

struct Ctx {
    workspace: Workspace<MemoryBackend>,
    file_id: FileId,
}

impl Ctx {
    async fn file(&self) -> DiagramFile {
        self.workspace
            .manager()
            .lock()
            .await
            .store()
            .get_file(&self.file_id)
            .expect("file")
    }
}

#[fixture]
fn ctx() -> Ctx {
    let workspace = Workspace::from_backend(MemoryBackend::new(), &VaultConfig::default());
    let file_id = workspace
        .manager()
        .try_lock()
        .expect("uncontended")
        .store_mut()
        .create_file(NewFileParams::named("Flow"))
        .expect("create")
        .id()
        .clone();
    Ctx { workspace, file_id }
}

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn add_node(id: &str, label: &str) -> ShadowOp {
    ShadowOp::AddNode {
        node_id: nid(id),
        module_id: None,
        node_type: NodeType::Process,
        label: label.to_owned(),
        bounds: None,
        properties: BTreeMap::new(),
    }
}

fn add_edge(id: &str, from: &str, to: &str) -> ShadowOp {
    ShadowOp::AddEdge {
        edge_id: EdgeId::new(id).expect("edge id"),
        source_node_id: nid(from),
        target_node_id: nid(to),
        edge_type: EdgeType::Flow,
        label: None,
    }
}

fn after_autosave() -> Duration {
    Duration::from_millis(2500)
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn operations_without_an_open_file_fail(mut ctx: Ctx) {
    assert!(matches!(ctx.workspace.edit(Vec::new()), Err(VaultError::NoFileOpen)));
    assert!(matches!(ctx.workspace.apply_ops(&[]), Err(VaultError::NoFileOpen)));
    assert!(matches!(ctx.workspace.auto_layout(), Err(VaultError::NoFileOpen)));
    assert!(matches!(
        ctx.workspace.save_version(None).await,
        Err(VaultError::NoFileOpen)
    ));
    assert!(ctx.workspace.elements().is_empty());
    assert!(ctx.workspace.shadow_project().nodes().is_empty());
    assert_eq!(ctx.workspace.close_file(), None);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn ops_are_autosaved_with_mapping_metadata(mut ctx: Ctx) {
    ctx.workspace.open_file(&ctx.file_id).await.expect("open");
    let result = ctx
        .workspace
        .apply_ops(&[
            add_node("a", "Receive"),
            add_node("b", "Ship"),
            add_edge("ab", "a", "b"),
        ])
        .expect("apply");
    assert_eq!(result.delta.added.len(), 3);
    assert!(ctx.workspace.has_pending_autosave());

    tokio::time::sleep(after_autosave()).await;
    let file = ctx.file().await;
    assert_eq!(file.simple_versions().len(), 2);
    let current = file.current_simple_version().expect("current");
    assert!(current.is_auto_save());
    let stored = current.elements().expect("elements");
    assert!(stored
        .iter()
        .any(|element| element.custom_str(NODE_ID_KEY) == Some("a")));

    // Reopening rebuilds the same semantic graph from the stored elements alone.
    let before = ctx.workspace.shadow_project();
    ctx.workspace.open_file(&ctx.file_id).await.expect("reopen");
    assert_eq!(ctx.workspace.shadow_project(), before);
    assert_eq!(before.live_edges().count(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn rejected_ops_change_nothing(mut ctx: Ctx) {
    ctx.workspace.open_file(&ctx.file_id).await.expect("open");
    let err = ctx
        .workspace
        .apply_ops(&[add_node("a", "A"), add_edge("ax", "a", "ghost")])
        .expect_err("missing node");
    assert!(matches!(
        err,
        VaultError::EditRejected {
            source: ApplyError::MissingNode { .. }
        }
    ));
    assert!(ctx.workspace.elements().is_empty());
    assert!(!ctx.workspace.has_pending_autosave());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn explicit_save_replaces_the_pending_autosave(mut ctx: Ctx) {
    ctx.workspace.open_file(&ctx.file_id).await.expect("open");
    ctx.workspace
        .edit(vec![rect("A", 0.0, 0.0)])
        .expect("edit");
    let file = ctx
        .workspace
        .save_version(Some("first step".to_owned()))
        .await
        .expect("save");
    assert_eq!(file.simple_versions().len(), 2);
    assert!(!ctx.workspace.has_pending_autosave());

    tokio::time::sleep(after_autosave()).await;
    let file = ctx.file().await;
    assert_eq!(file.simple_versions().len(), 2);
    let current = file.current_simple_version().expect("current");
    assert_eq!(current.note(), Some("first step"));
    assert!(!current.is_auto_save());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn closing_cancels_the_pending_autosave(mut ctx: Ctx) {
    ctx.workspace.open_file(&ctx.file_id).await.expect("open");
    ctx.workspace
        .edit(vec![rect("A", 0.0, 0.0)])
        .expect("edit");
    assert_eq!(ctx.workspace.close_file(), Some(ctx.file_id.clone()));
    assert!(ctx.workspace.mapping().is_none());

    tokio::time::sleep(after_autosave()).await;
    assert_eq!(ctx.file().await.simple_versions().len(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn auto_layout_rewrites_geometry_and_schedules_a_save(mut ctx: Ctx) {
    ctx.workspace.open_file(&ctx.file_id).await.expect("open");
    ctx.workspace.edit(chain_abc()).expect("edit");
    ctx.workspace.flush().await.expect("flush");

    ctx.workspace.auto_layout().expect("layout");
    let a = ctx
        .workspace
        .elements()
        .iter()
        .find(|element| element.id == eid("A"))
        .expect("A");
    assert_eq!((a.x, a.y), (100.0, 100.0));
    assert!(ctx.workspace.has_pending_autosave());

    // A second pass is a no-op and leaves nothing to save.
    tokio::time::sleep(after_autosave()).await;
    ctx.workspace.auto_layout().expect("layout again");
    assert!(!ctx.workspace.has_pending_autosave());
    assert_eq!(ctx.file().await.simple_versions().len(), 3);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn flush_only_writes_when_something_changed(mut ctx: Ctx) {
    ctx.workspace.open_file(&ctx.file_id).await.expect("open");
    assert!(!ctx.workspace.flush().await.expect("flush"));

    ctx.workspace
        .edit(vec![rect("A", 0.0, 0.0)])
        .expect("edit");
    assert!(ctx.workspace.flush().await.expect("flush"));
    assert!(!ctx.workspace.has_pending_autosave());
    assert_eq!(ctx.file().await.simple_versions().len(), 2);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn switching_versions_reloads_elements(mut ctx: Ctx) {
    let initial = ctx.workspace.open_file(&ctx.file_id).await.expect("open");
    let initial_id = initial.current_simple_version_id().clone();

    ctx.workspace
        .apply_ops(&[add_node("a", "A")])
        .expect("apply");
    ctx.workspace.save_version(None).await.expect("save");
    assert_eq!(ctx.workspace.shadow_project().nodes().len(), 1);

    let file = ctx
        .workspace
        .switch_simple_version(&initial_id)
        .await
        .expect("switch");
    assert_eq!(file.current_simple_version_id(), &initial_id);
    assert!(ctx.workspace.elements().is_empty());
    assert!(ctx.workspace.mapping().expect("open").is_empty());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn professional_generation_flushes_first(mut ctx: Ctx) {
    ctx.workspace.open_file(&ctx.file_id).await.expect("open");
    ctx.workspace
        .apply_ops(&[add_node("a", "A"), add_node("b", "B"), add_edge("ab", "a", "b")])
        .expect("apply");

    let file = ctx
        .workspace
        .generate_professional_version(EnhancementOptions::default(), None)
        .await
        .expect("generate");
    assert_eq!(file.versions(VersionType::Simple).len(), 2);
    let professional = file.current_professional_version().expect("professional");
    assert_eq!(
        professional.source_simple_version_id(),
        Some(file.current_simple_version_id())
    );
    let (xml, _) = professional.professional().expect("payload");
    assert!(xml.contains(r#"id="node-a" value="A""#));
}

#[test]
fn sync_mapping_drops_vanished_elements_and_adopts_stamped_ones() {
    let mut stamped = rect("s", 0.0, 0.0);
    stamped.set_custom(NODE_ID_KEY, "n2");
    let mut gone = rect("g", 0.0, 0.0);
    gone.is_deleted = true;

    let mut mapping = MappingIndex::new();
    mapping.map(eid("g"), nid("n1"), crate::mapping::default_module_id());
    mapping.map(eid("kept"), nid("n3"), crate::mapping::default_module_id());

    sync_mapping(&mut mapping, &[gone, stamped, rect("kept", 0.0, 0.0)]);
    assert!(mapping.lookup_node(&eid("g")).is_none());
    assert_eq!(mapping.lookup_node(&eid("s")).map(|(node, _)| node), Some(&nid("n2")));
    assert_eq!(mapping.lookup_node(&eid("kept")).map(|(node, _)| node), Some(&nid("n3")));
}

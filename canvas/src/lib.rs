//! Connector routing and canvas editing engine for the whiteboard.
//!
//! The crate owns the editor's in-memory state and the geometry behind
//! connector lines: anchors on element sides, anchor-pair selection, free-point
//! snapping, orthogonal and Bezier path construction, and the drag session that
//! creates connectors from pointer input. The host feeds raw input events to
//! [`engine::EngineCore`], paints the [`render::Scene`] it returns, and
//! persists the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Event facade: [`engine::EngineCore`] and host actions |
//! | [`doc`] | Element model and the in-memory element store |
//! | [`anchor`] | Side and center anchors of box elements |
//! | [`routing`] | Anchor-pair selection, snapping, axis lock |
//! | [`path`] | Orthogonal, straight, and curved path commands |
//! | [`bezier`] | Initial control placement and cubic evaluation |
//! | [`connector`] | Connector drag-session state machine |
//! | [`hit`] | Hit-testing for elements, anchors, line and resize handles |
//! | [`input`] | Tools, modifiers, and the gesture state machine |
//! | [`tool`] | Active tool, per-tool options, shortcuts |
//! | [`history`] | Capped undo snapshots |
//! | [`comment`] | Comment store and its persisted blob |
//! | [`render`] | Pure render model: draw primitives and overlays |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`geom`] | Points, bounds, and distance helpers |
//! | [`consts`] | Shared tunables (snap radius, handle sizes, limits) |

pub mod anchor;
pub mod bezier;
pub mod camera;
pub mod comment;
pub mod connector;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod history;
pub mod hit;
pub mod input;
pub mod path;
pub mod render;
pub mod routing;
pub mod tool;

//! Page rendering.
//!
//! A [`MapView`] is flattened into a [`ViewModel`] (what the browser needs to
//! draw it) and embedded as JSON in a single HTML page whose script hands it to
//! Leaflet. The same model is served by `/api/view`.
//!
//! Overlays are either embedded in the model or listed as pending, in which
//! case the script fetches each one on its own and adds it when it arrives.

use quake_common::{LayerContent, LayerGroup, QuakeResult};
use renderer::html::escape;
use serde::Serialize;
use tracing::warn;

use crate::view::{ControlEntry, LayerControl, MapView, Notice, Overlay};

const LEAFLET_VERSION: &str = "1.9.4";

/// Everything the page script needs, in Leaflet's terms.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub center: [f64; 2],
    pub zoom: u32,
    pub base_layers: Vec<BaseLayerModel>,
    pub overlays: Vec<OverlayModel>,
    pub legend: Option<LegendModel>,
    pub control: LayerControl,
    pub notices: Vec<Notice>,
    pub pending: Vec<PendingOverlay>,
}

/// An overlay the page loads after it is shown.
#[derive(Debug, Clone, Serialize)]
pub struct PendingOverlay {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BaseLayerModel {
    pub id: String,
    pub title: String,
    pub url: String,
    pub subdomains: Vec<String>,
    pub attribution: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayModel {
    pub id: String,
    pub title: String,
    pub visible: bool,
    #[serde(flatten)]
    pub elements: OverlayElements,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayElements {
    Markers {
        markers: Vec<MarkerModel>,
    },
    Lines {
        color: String,
        weight: f64,
        /// Each line as `[lat, lon]` pairs.
        lines: Vec<Vec<[f64; 2]>>,
    },
}

/// Circle options plus its popup.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerModel {
    pub lat_lng: [f64; 2],
    pub radius: f64,
    pub fill_color: String,
    pub color: Option<String>,
    pub stroke: bool,
    pub fill_opacity: f64,
    pub popup: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendModel {
    pub position: &'static str,
    pub html: String,
}

impl ViewModel {
    /// Flatten `view` for the browser.
    ///
    /// `tile_proxy` is the base URL of a running tile proxy (`""` for same-origin).
    /// Without one, base layers that need post-processing are left out.
    pub fn build(view: &MapView, tile_proxy: Option<&str>) -> Self {
        let active_id = view.active_base().id.clone();

        let mut base_layers = Vec::with_capacity(view.base_layers().len());
        for layer in view.base_layers() {
            let Some(tiles) = layer.page_template(tile_proxy) else {
                warn!(
                    layer = %layer.id,
                    "No tile proxy available, leaving processed base layer off the page"
                );
                continue;
            };
            base_layers.push(BaseLayerModel {
                id: layer.id.to_string(),
                title: layer.title.clone(),
                url: tiles.template,
                subdomains: tiles.subdomains,
                attribution: layer.attribution.clone(),
                active: layer.id == active_id,
            });
        }

        // The active layer may have been dropped above.
        if !base_layers.iter().any(|b| b.active) {
            if let Some(first) = base_layers.first_mut() {
                first.active = true;
            }
        }

        let overlays: Vec<OverlayModel> =
            view.overlays().iter().map(OverlayModel::from_overlay).collect();

        let legend = match (view.legend(), view.legend_html()) {
            (Some(legend), Some(html)) => Some(LegendModel {
                position: legend.position.as_str(),
                html: html.to_string(),
            }),
            _ => None,
        };

        let control = LayerControl {
            collapsed: false,
            base_layers: base_layers
                .iter()
                .map(|b| ControlEntry {
                    id: b.id.clone(),
                    title: b.title.clone(),
                    checked: b.active,
                })
                .collect(),
            overlays: overlays
                .iter()
                .map(|o| ControlEntry {
                    id: o.id.clone(),
                    title: o.title.clone(),
                    checked: o.visible,
                })
                .collect(),
        };

        let viewport = view.viewport();
        Self {
            center: viewport.center,
            zoom: viewport.zoom,
            base_layers,
            overlays,
            legend,
            control,
            notices: view.notices().to_vec(),
            pending: Vec::new(),
        }
    }

    /// Overlays for the page script to fetch itself.
    pub fn with_pending(mut self, pending: Vec<PendingOverlay>) -> Self {
        self.pending = pending;
        self
    }
}

impl OverlayModel {
    pub fn from_overlay(overlay: &Overlay) -> Self {
        Self::from_group(&overlay.group, overlay.visible)
    }

    /// Markers that draw as nothing are left out.
    pub fn from_group(group: &LayerGroup, visible: bool) -> Self {
        let elements = match group.content() {
            LayerContent::Markers { markers } => OverlayElements::Markers {
                markers: markers
                    .iter()
                    .filter(|m| m.is_visible())
                    .map(|m| MarkerModel {
                        lat_lng: m.center.to_lat_lon(),
                        radius: m.radius_meters,
                        fill_color: m.fill_color.clone(),
                        color: m.stroke_color.clone(),
                        stroke: m.stroke_color.is_some(),
                        fill_opacity: m.fill_opacity,
                        popup: m.label.clone(),
                    })
                    .collect(),
            },
            LayerContent::Boundaries { segments, style } => OverlayElements::Lines {
                color: style.color.clone(),
                weight: style.weight,
                lines: segments
                    .iter()
                    .map(|s| s.vertices.iter().map(|v| v.to_lat_lon()).collect())
                    .collect(),
            },
        };

        Self {
            id: group.id.to_string(),
            title: group.title.clone(),
            visible,
            elements,
        }
    }
}

/// Serialize for embedding inside a `<script>` element.
fn script_json(model: &ViewModel) -> QuakeResult<String> {
    let json = serde_json::to_string(model)?;
    Ok(json.replace("</", "<\\/"))
}

/// Render the complete HTML page for a view model.
pub fn render_page(title: &str, model: &ViewModel) -> QuakeResult<String> {
    let data = script_json(model)?;
    let mut notices = String::new();
    for notice in &model.notices {
        notices.push_str(&format!(
            "<div class=\"notice\">{}</div>",
            escape(&notice.message)
        ));
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.css">
<style>
html, body, #map {{ height: 100%; margin: 0; padding: 0; }}
#notices {{ position: absolute; top: 10px; left: 50px; z-index: 1000; }}
.notice {{ background: #fff3cd; border: 1px solid #e0b252; border-radius: 4px; padding: 4px 8px; margin-bottom: 4px; font: 13px sans-serif; }}
</style>
</head>
<body>
<div id="map"></div>
<div id="notices">{notices}</div>
<script src="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.js"></script>
<script>
const VIEW = {data};
{script}
</script>
</body>
</html>
"#,
        title = escape(title),
        leaflet = LEAFLET_VERSION,
        notices = notices,
        data = data,
        script = PAGE_SCRIPT,
    ))
}

const PAGE_SCRIPT: &str = r#"(function () {
  const baseMaps = {};
  const overlayMaps = {};
  const initial = [];

  function overlayGroup(o) {
    const group = L.layerGroup();
    if (o.kind === "markers") {
      for (const m of o.markers) {
        L.circle(m.lat_lng, {
          radius: m.radius,
          fillColor: m.fill_color,
          color: m.color || m.fill_color,
          stroke: m.stroke,
          fillOpacity: m.fill_opacity
        }).bindPopup(m.popup).addTo(group);
      }
    } else {
      L.polyline(o.lines, { color: o.color, weight: o.weight }).addTo(group);
    }
    return group;
  }

  function notice(text) {
    const div = document.createElement("div");
    div.className = "notice";
    div.textContent = text;
    document.getElementById("notices").appendChild(div);
  }

  for (const b of VIEW.base_layers) {
    const layer = L.tileLayer(b.url, {
      attribution: b.attribution,
      subdomains: b.subdomains.length ? b.subdomains : "abc",
      maxZoom: 19
    });
    baseMaps[b.title] = layer;
    if (b.active) initial.push(layer);
  }

  for (const o of VIEW.overlays) {
    const group = overlayGroup(o);
    overlayMaps[o.title] = group;
    if (o.visible) initial.push(group);
  }

  const map = L.map("map", {
    center: VIEW.center,
    zoom: VIEW.zoom,
    layers: initial
  });

  const control = L.control
    .layers(baseMaps, overlayMaps, { collapsed: VIEW.control.collapsed })
    .addTo(map);

  if (VIEW.legend) {
    const legend = L.control({ position: VIEW.legend.position });
    legend.onAdd = function () {
      const div = L.DomUtil.create("div");
      div.innerHTML = VIEW.legend.html;
      return div;
    };
    legend.addTo(map);
  }

  for (const p of VIEW.pending) {
    fetch(p.url)
      .then(function (r) {
        return r.json().then(function (body) {
          if (!r.ok) throw new Error(body.error || r.statusText);
          return body;
        });
      })
      .then(function (o) {
        const group = overlayGroup(o);
        if (o.visible) group.addTo(map);
        control.addOverlay(group, o.title);
      })
      .catch(function (err) {
        notice(p.title + " could not be loaded: " + err.message);
      });
  }
})();"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quake_common::{
        BoundarySegment, LayerGroup, LayerId, LineStyle, LonLat, QuakeError, TileUrlTemplate,
        VisualMarker,
    };
    use renderer::{build_depth_legend, Grayscale, Identity};

    use crate::view::{BaseLayer, Viewport};

    fn marker(lon: f64, lat: f64, radius: f64) -> VisualMarker {
        VisualMarker {
            center: LonLat::new(lon, lat),
            radius_meters: radius,
            fill_color: "#ff5142".to_string(),
            stroke_color: None,
            fill_opacity: 0.75,
            label: "<h2>Somewhere</h2>".to_string(),
        }
    }

    fn view() -> MapView {
        let mut view = MapView::new(
            Viewport {
                center: [0.0, 0.0],
                zoom: 2,
            },
            vec![
                BaseLayer::new(
                    LayerId::new("satellite"),
                    "Satellite",
                    TileUrlTemplate::new("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"),
                    "OSM",
                    Arc::new(Identity),
                ),
                BaseLayer::new(
                    LayerId::new("greyscale"),
                    "Greyscale",
                    TileUrlTemplate::new("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"),
                    "OSM",
                    Arc::new(Grayscale::default()),
                ),
            ],
        )
        .unwrap();
        view.attach_legend(build_depth_legend());
        view.add_overlay(LayerGroup::markers(
            LayerId::new("earthquakes"),
            "Earthquakes",
            vec![marker(10.0, 20.0, 50_000.0), marker(30.0, 40.0, -80_000.0)],
        ));
        view.add_overlay(LayerGroup::boundaries(
            LayerId::new("tectonic_plates"),
            "Tectonic Plates",
            vec![BoundarySegment::new(vec![
                LonLat::new(100.0, -45.0),
                LonLat::new(101.5, -46.2),
            ])],
            LineStyle::default(),
        ));
        view
    }

    #[test]
    fn test_invisible_markers_left_out() {
        let model = ViewModel::build(&view(), Some(""));
        match &model.overlays[0].elements {
            OverlayElements::Markers { markers } => {
                assert_eq!(markers.len(), 1);
                assert_eq!(markers[0].lat_lng, [20.0, 10.0]);
                assert!(!markers[0].stroke);
            }
            other => panic!("unexpected overlay: {:?}", other),
        }
    }

    #[test]
    fn test_lines_are_lat_lon() {
        let model = ViewModel::build(&view(), Some(""));
        match &model.overlays[1].elements {
            OverlayElements::Lines {
                color,
                weight,
                lines,
            } => {
                assert_eq!(color, "#99ff66");
                assert_eq!(*weight, 2.0);
                assert_eq!(lines[0], vec![[-45.0, 100.0], [-46.2, 101.5]]);
            }
            other => panic!("unexpected overlay: {:?}", other),
        }
    }

    #[test]
    fn test_processed_layer_dropped_without_proxy() {
        let mut view = view();
        view.select_base("greyscale").unwrap();

        let model = ViewModel::build(&view, None);
        let ids: Vec<&str> = model.base_layers.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["satellite"]);
        assert!(model.base_layers[0].active);
        assert_eq!(model.control.base_layers.len(), 1);

        let proxied = ViewModel::build(&view, Some(""));
        assert_eq!(proxied.base_layers[1].url, "/tiles/greyscale/{z}/{x}/{y}.png");
        assert!(proxied.base_layers[1].active);
        assert!(!proxied.base_layers[0].active);
    }

    #[test]
    fn test_model_json_shape() {
        let model = ViewModel::build(&view(), Some(""));
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["overlays"][0]["kind"], "markers");
        assert_eq!(json["overlays"][1]["kind"], "lines");
        assert_eq!(json["legend"]["position"], "bottomright");
        assert_eq!(json["control"]["collapsed"], false);
        assert_eq!(json["center"], serde_json::json!([0.0, 0.0]));
    }

    #[test]
    fn test_render_page_embeds_model_and_notices() {
        let mut view = view();
        view.attach_loaded(
            "volcanoes",
            "Volcanoes",
            Err(QuakeError::Timeout),
        );
        let model = ViewModel::build(&view, Some(""));
        let html = render_page("Earthquakes <Past Month>", &model).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Earthquakes &lt;Past Month&gt;</title>"));
        assert!(html.contains("const VIEW = {"));
        assert!(html.contains("Volcanoes could not be loaded: Request timeout"));
        assert!(html.contains("leaflet@1.9.4"));
    }

    #[test]
    fn test_pending_overlays_in_page() {
        let model = ViewModel::build(&view(), Some("")).with_pending(vec![PendingOverlay {
            id: "tectonic_plates".to_string(),
            title: "Tectonic Plates".to_string(),
            url: "/api/overlays/tectonic_plates".to_string(),
        }]);
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["pending"][0]["url"], "/api/overlays/tectonic_plates");

        let html = render_page("Earthquakes", &model).unwrap();
        assert!(html.contains("\"url\":\"/api/overlays/tectonic_plates\""));
        assert!(html.contains("control.addOverlay(group, o.title)"));
    }

    #[test]
    fn test_overlay_model_from_group() {
        let view = view();
        let overlay = OverlayModel::from_group(&view.overlays()[1].group, false);
        assert_eq!(overlay.id, "tectonic_plates");
        assert!(!overlay.visible);

        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json["kind"], "lines");
        assert_eq!(json["lines"][0][0], serde_json::json!([-45.0, 100.0]));
    }

    #[test]
    fn test_script_json_cannot_close_script_element() {
        let mut view = view();
        view.add_overlay(LayerGroup::markers(
            LayerId::new("earthquakes"),
            "Earthquakes",
            vec![VisualMarker {
                label: "</script><script>alert(1)</script>".to_string(),
                ..marker(0.0, 0.0, 10.0)
            }],
        ));
        let json = script_json(&ViewModel::build(&view, Some(""))).unwrap();
        assert!(!json.contains("</script>"));
        assert!(json.contains("<\\/script>"));
    }
}

//! Publicador de QR de navegación
//!
//! Mantiene la selección de navegación de la sesión y genera el panel
//! lateral: imagen PNG del enlace pendiente y el tramo que representa.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;
use std::path::PathBuf;

use crate::dto::navigation_dto::QrPanel;
use crate::models::route::RouteSegment;
use crate::models::session::SessionContext;
use crate::services::navigation_service::NavigationLinkGenerator;
use crate::utils::errors::{AppError, AppResult};

pub const GENERIC_CAPTION: &str = "QRCODE OF NAVI:";
pub const QR_IMAGE_CAPTION: &str = "扫码导航";
pub const PLACEHOLDER_IMAGE_CAPTION: &str = "try it!";

#[derive(Debug, Clone)]
pub struct QrPublisher {
    generator: NavigationLinkGenerator,
    placeholder_path: Option<PathBuf>,
}

impl QrPublisher {
    pub fn new(generator: NavigationLinkGenerator, placeholder_path: Option<PathBuf>) -> Self {
        Self {
            generator,
            placeholder_path,
        }
    }

    /// Seleccionar un segmento: reemplaza cualquier selección anterior
    pub fn select_segment(&self, session: &mut SessionContext, segment: &RouteSegment) -> String {
        let url = self.generator.build_link(segment);
        if let Some(previous) = session.pending_navigation.replace(url.clone()) {
            log::debug!("🔁 Selección anterior descartada: {}", previous);
        }
        tracing::info!("🧭 Sesión {}: navegación {}", session.id, segment.caption());
        url
    }

    /// Búsqueda inversa del segmento por su enlace; gana la primera coincidencia
    pub fn find_segment<'a>(
        &self,
        url: &str,
        segments: &'a [RouteSegment],
    ) -> Option<(usize, &'a RouteSegment)> {
        segments
            .iter()
            .enumerate()
            .find(|(_, segment)| self.generator.build_link(segment) == url)
    }

    /// Codificar el enlace como PNG
    pub fn render_png(&self, url: &str) -> AppResult<Vec<u8>> {
        let code = QrCode::new(url.as_bytes()).map_err(|e| AppError::QrEncoding(e.to_string()))?;
        let image = code.render::<Luma<u8>>().min_dimensions(256, 256).build();

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| AppError::QrEncoding(e.to_string()))?;
        Ok(png)
    }

    async fn placeholder_image(&self) -> Option<Vec<u8>> {
        let path = self.placeholder_path.as_ref()?;
        match tokio::fs::read(path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::debug!("🖼️ Imagen de ejemplo no disponible ({}): {}", path.display(), e);
                None
            }
        }
    }

    /// Panel lateral para la selección pendiente sobre los segmentos filtrados actuales
    pub async fn render_panel(
        &self,
        pending: Option<&str>,
        segments: &[RouteSegment],
    ) -> AppResult<QrPanel> {
        let Some(url) = pending else {
            return Ok(QrPanel {
                caption: GENERIC_CAPTION.to_string(),
                image_caption: PLACEHOLDER_IMAGE_CAPTION.to_string(),
                url: None,
                image_base64: self.placeholder_image().await.map(|bytes| STANDARD.encode(bytes)),
                placeholder: true,
                segment_index: None,
            });
        };

        let matched = self.find_segment(url, segments);
        let caption = match matched {
            Some((_, segment)) => segment.caption(),
            None => {
                // el filtro de día cambió después de seleccionar: el QR sigue siendo el anterior
                tracing::warn!("⚠️ Enlace pendiente sin segmento en el filtro actual");
                GENERIC_CAPTION.to_string()
            }
        };

        let png = self.render_png(url)?;
        Ok(QrPanel {
            caption,
            image_caption: QR_IMAGE_CAPTION.to_string(),
            url: Some(url.to_string()),
            image_base64: Some(STANDARD.encode(png)),
            placeholder: false,
            segment_index: matched.map(|(index, _)| index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::{LngLat, Waypoint};

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn segment(day: u32, origin: &str, destination: &str, lng: f64) -> RouteSegment {
        RouteSegment {
            day,
            origin: Waypoint {
                name: origin.to_string(),
                position: LngLat { lng: 113.328508, lat: 23.121988 },
            },
            destination: Waypoint {
                name: destination.to_string(),
                position: LngLat { lng, lat: 23.119 },
            },
        }
    }

    fn publisher() -> QrPublisher {
        QrPublisher::new(NavigationLinkGenerator::default(), None)
    }

    #[tokio::test]
    async fn test_panel_without_selection_is_placeholder() {
        let panel = publisher().render_panel(None, &[]).await.unwrap();

        assert!(panel.placeholder);
        assert_eq!(panel.caption, GENERIC_CAPTION);
        assert_eq!(panel.image_caption, PLACEHOLDER_IMAGE_CAPTION);
        assert!(panel.url.is_none());
        assert!(panel.image_base64.is_none());
    }

    #[tokio::test]
    async fn test_placeholder_image_is_served_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qrcode_ex.png");
        tokio::fs::write(&path, PNG_SIGNATURE).await.unwrap();

        let publisher = QrPublisher::new(NavigationLinkGenerator::default(), Some(path));
        let panel = publisher.render_panel(None, &[]).await.unwrap();
        assert_eq!(panel.image_base64, Some(STANDARD.encode(PNG_SIGNATURE)));
    }

    #[tokio::test]
    async fn test_select_then_render_recovers_segment() {
        let publisher = publisher();
        let segments = vec![
            segment(1, "Hotel", "S1", 113.30),
            segment(1, "S1", "S2", 113.31),
            segment(2, "S2", "S3", 113.32),
        ];
        let mut session = SessionContext::new();

        publisher.select_segment(&mut session, &segments[0]);
        let url = publisher.select_segment(&mut session, &segments[1]);
        assert_eq!(session.pending_navigation.as_deref(), Some(url.as_str()));

        let panel = publisher
            .render_panel(session.pending_navigation.as_deref(), &segments)
            .await
            .unwrap();
        assert_eq!(panel.caption, "S1 → S2");
        assert_eq!(panel.segment_index, Some(1));
        assert_eq!(panel.image_caption, QR_IMAGE_CAPTION);

        let png = STANDARD.decode(panel.image_base64.unwrap()).unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
    }

    #[tokio::test]
    async fn test_stale_selection_falls_back_to_generic_caption() {
        let publisher = publisher();
        let day_one = vec![segment(1, "Hotel", "S1", 113.30)];
        let day_two = vec![segment(2, "S2", "S3", 113.32)];
        let mut session = SessionContext::new();

        let url = publisher.select_segment(&mut session, &day_one[0]);
        let panel = publisher.render_panel(Some(&url), &day_two).await.unwrap();

        assert_eq!(panel.caption, GENERIC_CAPTION);
        assert_eq!(panel.url.as_deref(), Some(url.as_str()));
        assert!(panel.image_base64.is_some());
        assert!(!panel.placeholder);
    }

    #[test]
    fn test_duplicate_links_resolve_to_first_segment() {
        let publisher = publisher();
        let first = segment(1, "Hotel", "S1", 113.30);
        let mut second = first.clone();
        second.day = 3;
        let segments = vec![first, second];

        let url = NavigationLinkGenerator::default().build_link(&segments[1]);
        let (index, found) = publisher.find_segment(&url, &segments).unwrap();
        assert_eq!(index, 0);
        assert_eq!(found.day, 1);
    }
}

//! 写真デコード（tokio のブロッキングプールで実行）

use super::raster::DecodedPhoto;
use photo_bingo_common::{CellError, Photo, PhotoDecoder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

/// `image` クレートによるデコーダ。1枚ごとにタイムアウトを持つ。
///
/// 同時に展開する写真は `max_concurrent` 枚まで。
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl ImageDecoder {
    pub fn new(timeout: Duration, max_concurrent: usize) -> Self {
        Self {
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// いま空いているデコード枠
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

impl PhotoDecoder for ImageDecoder {
    type Image = DecodedPhoto;

    async fn decode(&self, cell_index: usize, photo: &Photo) -> Result<DecodedPhoto, CellError> {
        // 枠待ちもタイムアウトに含める
        let decode = async {
            let permit = self
                .permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| CellError::Decode(e.to_string()))?;
            let bytes = photo.bytes().to_vec();
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                image::load_from_memory(&bytes).map(|img| img.to_rgba8())
            })
            .await
            .map_err(|join| CellError::Decode(join.to_string()))
        };

        match tokio::time::timeout(self.timeout, decode).await {
            Ok(Ok(Ok(image))) => {
                debug!(cell = cell_index, width = image.width(), height = image.height(), "photo decoded");
                Ok(DecodedPhoto(image))
            }
            Ok(Ok(Err(e))) => Err(CellError::Decode(e.to_string())),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(CellError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbImage::from_pixel(w, h, Rgb([10, 20, 30]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_decode_png() {
        let decoder = ImageDecoder::new(Duration::from_secs(5), 4);
        let photo = Photo::new("image/png", png_bytes(8, 6));

        let image = decoder.decode(0, &photo).await.unwrap();
        assert_eq!((image.0.width(), image.0.height()), (8, 6));
    }

    #[tokio::test]
    async fn test_decode_garbage_is_cell_error() {
        let decoder = ImageDecoder::new(Duration::from_secs(5), 4);
        let photo = Photo::jpeg(b"not an image".to_vec());

        let err = decoder.decode(3, &photo).await.unwrap_err();
        assert!(matches!(err, CellError::Decode(_)));
    }

    #[tokio::test]
    async fn test_single_permit_decodes_all() {
        let decoder = ImageDecoder::new(Duration::from_secs(5), 1);
        let photos: Vec<Photo> = (1..=3).map(|i| Photo::new("image/png", png_bytes(i, i))).collect();

        let (a, b, c) = tokio::join!(
            decoder.decode(0, &photos[0]),
            decoder.decode(1, &photos[1]),
            decoder.decode(2, &photos[2]),
        );
        assert_eq!(a.unwrap().0.width(), 1);
        assert_eq!(b.unwrap().0.width(), 2);
        assert_eq!(c.unwrap().0.width(), 3);
        assert_eq!(decoder.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_busy_permits_count_toward_timeout() {
        let decoder = ImageDecoder::new(Duration::from_millis(50), 1);
        // 枠を埋めたままにする
        let held = decoder.permits.clone().acquire_owned().await.unwrap();
        assert_eq!(decoder.available_permits(), 0);

        let photo = Photo::new("image/png", png_bytes(2, 2));
        let err = decoder.decode(0, &photo).await.unwrap_err();
        assert!(matches!(err, CellError::Timeout(_)));

        drop(held);
        assert!(decoder.decode(0, &photo).await.is_ok());
    }
}

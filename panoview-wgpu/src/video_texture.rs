/// Single-slot upload memoization keyed on the video sampling timestamp.
/// Two renders at the same timestamp cost one upload; a changed timestamp
/// invalidates the slot.
pub struct UploadMemo {
    last_time: Option<f64>,
}

impl UploadMemo {
    pub fn new() -> Self {
        Self { last_time: None }
    }

    pub fn needs_upload(&self, timestamp: f64) -> bool {
        self.last_time != Some(timestamp)
    }

    pub fn mark_uploaded(&mut self, timestamp: f64) {
        self.last_time = Some(timestamp);
    }

    /// Forget the memoized timestamp (video source changed).
    pub fn invalidate(&mut self) {
        self.last_time = None;
    }
}

impl Default for UploadMemo {
    fn default() -> Self {
        Self::new()
    }
}

/// The one GPU texture holding the current video frame. Exclusively owned
/// and mutated by the renderer.
pub struct VideoTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
    memo: UploadMemo,
}

impl VideoTexture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Video Frame Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            // RENDER_ATTACHMENT is required by copyExternalImageToTexture.
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Video Frame Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
            memo: UploadMemo::new(),
        }
    }

    pub fn invalidate(&mut self) {
        self.memo.invalidate();
    }

    /// Upload a raw RGBA frame sampled at `timestamp`. Returns whether an
    /// upload actually happened (memoized away otherwise).
    pub fn upload_rgba(&mut self, queue: &wgpu::Queue, pixels: &[u8], timestamp: f64) -> bool {
        if !self.memo.needs_upload(timestamp) {
            return false;
        }
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.memo.mark_uploaded(timestamp);
        true
    }

    /// Upload the current frame of an HTML video element sampled at
    /// `timestamp`, flipping Y so the equirectangular V axis matches the
    /// shader. Returns whether an upload actually happened.
    #[cfg(target_arch = "wasm32")]
    pub fn upload_video(
        &mut self,
        queue: &wgpu::Queue,
        video: &web_sys::HtmlVideoElement,
        timestamp: f64,
    ) -> bool {
        if !self.memo.needs_upload(timestamp) {
            return false;
        }
        queue.copy_external_image_to_texture(
            &wgpu::ImageCopyExternalImage {
                source: wgpu::ExternalImageSource::HTMLVideoElement(video.clone()),
                origin: wgpu::Origin2d::ZERO,
                flip_y: true,
            },
            wgpu::ImageCopyTextureTagged {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
                color_space: wgpu::PredefinedColorSpace::Srgb,
                premultiplied_alpha: false,
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.memo.mark_uploaded(timestamp);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── UploadMemo ──

    #[test]
    fn test_same_timestamp_uploads_once() {
        let mut memo = UploadMemo::new();
        assert!(memo.needs_upload(1.25));
        memo.mark_uploaded(1.25);
        assert!(!memo.needs_upload(1.25));
    }

    #[test]
    fn test_changed_timestamp_uploads_again() {
        let mut memo = UploadMemo::new();
        memo.mark_uploaded(1.25);
        assert!(memo.needs_upload(1.30));
        memo.mark_uploaded(1.30);
        assert!(!memo.needs_upload(1.30));
    }

    #[test]
    fn test_invalidate_forces_upload() {
        let mut memo = UploadMemo::new();
        memo.mark_uploaded(2.0);
        memo.invalidate();
        assert!(memo.needs_upload(2.0));
    }
}

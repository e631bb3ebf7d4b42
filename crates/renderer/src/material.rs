//! Surface appearance: which shader runs and what it samples.

use anyhow::{Result, ensure};
use asset::{
    mesh::VertexLayout,
    texture::{CubemapData, TextureData},
};
use wgpu::{
    AddressMode, BindGroupLayoutEntry, BindingType, Device, Extent3d, FilterMode, Origin3d, Queue,
    SamplerBindingType, SamplerDescriptor, ShaderStages, TexelCopyBufferLayout,
    TexelCopyTextureInfo, TextureAspect, TextureDescriptor, TextureDimension, TextureFormat,
    TextureSampleType, TextureUsages, TextureView, TextureViewDescriptor, TextureViewDimension,
};

/// What the mesh is shaded with. Each variant expects one vertex layout.
#[derive(Clone, Debug)]
pub enum Material {
    VertexColor,
    Texture2d(TextureData),
    Cubemap(CubemapData),
}

impl Material {
    pub fn expected_layout(&self) -> VertexLayout {
        match self {
            Self::VertexColor => VertexLayout::PositionColor,
            Self::Texture2d(_) => VertexLayout::PositionNormalTexcoord,
            Self::Cubemap(_) => VertexLayout::PositionNormal,
        }
    }

    pub fn check_layout(&self, layout: VertexLayout) -> Result<()> {
        ensure!(
            layout == self.expected_layout(),
            "Material {} needs {:?} vertices, mesh has {:?}",
            self.name(),
            self.expected_layout(),
            layout
        );
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::VertexColor => "vertex-color",
            Self::Texture2d(_) => "texture-2d",
            Self::Cubemap(_) => "cubemap",
        }
    }

    pub(crate) fn shader_source(&self) -> &'static str {
        match self {
            Self::VertexColor => include_str!("shaders/color.wgsl"),
            Self::Texture2d(_) => include_str!("shaders/phong_texture.wgsl"),
            Self::Cubemap(_) => include_str!("shaders/phong_cubemap.wgsl"),
        }
    }

    /// Texture view dimension sampled at binding 1, if any.
    pub(crate) fn view_dimension(&self) -> Option<TextureViewDimension> {
        match self {
            Self::VertexColor => None,
            Self::Texture2d(_) => Some(TextureViewDimension::D2),
            Self::Cubemap(_) => Some(TextureViewDimension::Cube),
        }
    }

    /// Bindings 1 (texture) and 2 (sampler); empty for vertex colors.
    pub(crate) fn layout_entries(&self) -> Vec<BindGroupLayoutEntry> {
        let Some(view_dimension) = self.view_dimension() else {
            return Vec::new();
        };
        vec![
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ]
    }

    /// Upload the texture data and create its sampler.
    pub(crate) fn upload(&self, device: &Device, queue: &Queue) -> Option<(TextureView, wgpu::Sampler)> {
        match self {
            Self::VertexColor => None,
            Self::Texture2d(tex) => {
                let view = upload_layers(
                    device,
                    queue,
                    "Texture2d",
                    tex.width,
                    tex.height,
                    &tex.data,
                    1,
                    TextureViewDimension::D2,
                );
                let sampler = device.create_sampler(&SamplerDescriptor {
                    label: Some("Texture2d Sampler"),
                    address_mode_u: AddressMode::Repeat,
                    address_mode_v: AddressMode::Repeat,
                    mag_filter: FilterMode::Linear,
                    min_filter: FilterMode::Linear,
                    ..Default::default()
                });
                Some((view, sampler))
            }
            Self::Cubemap(cube) => {
                let mut data = Vec::with_capacity(cube.face_len() * cube.faces.len());
                for face in &cube.faces {
                    data.extend_from_slice(&face.data);
                }
                let view = upload_layers(
                    device,
                    queue,
                    "Cubemap",
                    cube.size,
                    cube.size,
                    &data,
                    6,
                    TextureViewDimension::Cube,
                );
                let sampler = device.create_sampler(&SamplerDescriptor {
                    label: Some("Cubemap Sampler"),
                    address_mode_u: AddressMode::ClampToEdge,
                    address_mode_v: AddressMode::ClampToEdge,
                    address_mode_w: AddressMode::ClampToEdge,
                    mag_filter: FilterMode::Linear,
                    min_filter: FilterMode::Linear,
                    ..Default::default()
                });
                Some((view, sampler))
            }
        }
    }
}

/// `data` holds `layers` tightly packed RGBA8 images of `width` x `height`.
#[allow(clippy::too_many_arguments)]
fn upload_layers(
    device: &Device,
    queue: &Queue,
    label: &str,
    width: u32,
    height: u32,
    data: &[u8],
    layers: u32,
    dimension: TextureViewDimension,
) -> TextureView {
    let size = Extent3d {
        width,
        height,
        depth_or_array_layers: layers,
    };
    let texture = device.create_texture(&TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8UnormSrgb,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: Origin3d::ZERO,
            aspect: TextureAspect::All,
        },
        data,
        TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    log::info!("Uploaded {} texture {}x{}x{}", label, width, height, layers);

    texture.create_view(&TextureViewDescriptor {
        label: Some(label),
        dimension: Some(dimension),
        ..Default::default()
    })
}

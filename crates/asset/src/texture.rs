//! Texture loading and data structures.
//! 2D textures and six-face cubemaps, both RGBA8 before GPU upload.

use std::path::Path;

use anyhow::{Context, Result, ensure};

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

const BYTES_PER_PIXEL: usize = 4;

fn rgba8_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(
            data.len() == rgba8_len(width, height),
            "Data size {} doesn't match RGBA8 {}x{}",
            data.len(),
            width,
            height
        );
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Load a PNG or JPEG file, converting to RGBA8.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).with_context(|| format!("Failed to open image {:?}", path))?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::info!("Loaded texture {}x{} with {} bytes", width, height, data.len());

        Self::new_rgba8(width, height, data)
    }

    /// Create a simple test texture (checkerboard pattern).
    pub fn create_test_texture(size: u32) -> Self {
        let mut data = Vec::with_capacity(rgba8_len(size, size));

        for y in 0..size {
            for x in 0..size {
                let checker = ((x / 8) + (y / 8)) % 2;
                if checker == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }

        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Non-empty, and the byte count matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == rgba8_len(self.width, self.height)
    }
}

/// Face file names inside a cubemap directory, in layer order +X -X +Y -Y +Z -Z.
pub const CUBEMAP_FACES: [&str; 6] = [
    "right.jpg",
    "left.jpg",
    "top.jpg",
    "bottom.jpg",
    "front.jpg",
    "back.jpg",
];

/// Six square RGBA8 faces sharing one size.
#[derive(Clone, Debug)]
pub struct CubemapData {
    pub faces: [TextureData; 6],
    pub size: u32,
}

impl CubemapData {
    pub fn from_faces(faces: [TextureData; 6]) -> Result<Self> {
        let size = faces[0].width;
        for (face, name) in faces.iter().zip(CUBEMAP_FACES) {
            ensure!(face.is_valid(), "Cubemap face {} has invalid pixel data", name);
            ensure!(
                face.width == size && face.height == size,
                "Cubemap face {} is {}x{}, expected {}x{}",
                name,
                face.width,
                face.height,
                size,
                size
            );
        }
        ensure!(size > 0, "Cubemap faces are empty");
        Ok(Self { faces, size })
    }

    /// Load `right/left/top/bottom/front/back.jpg` from `dir`.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        log::info!("Loading cubemap from {:?}", dir);

        let [px, nx, py, ny, pz, nz] = CUBEMAP_FACES
            .map(|name| TextureData::load(dir.join(name)));
        Self::from_faces([px?, nx?, py?, ny?, pz?, nz?])
            .with_context(|| format!("Invalid cubemap in {:?}", dir))
    }

    /// Solid color per face, handy when no cubemap directory is given.
    pub fn create_test_cubemap(size: u32) -> Self {
        const COLORS: [[u8; 4]; 6] = [
            [230, 90, 90, 255],
            [90, 230, 90, 255],
            [90, 90, 230, 255],
            [230, 230, 90, 255],
            [90, 230, 230, 255],
            [230, 90, 230, 255],
        ];
        let faces = COLORS.map(|rgba| TextureData {
            data: rgba.repeat(size as usize * size as usize),
            width: size,
            height: size,
        });
        Self { faces, size }
    }

    /// Bytes of one face.
    pub fn face_len(&self) -> usize {
        rgba8_len(self.size, self.size)
    }
}

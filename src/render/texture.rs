use std::{io::Cursor, sync::mpsc};

use image::{ImageFormat, RgbaImage};
use vello::wgpu;

use crate::{
  Error, Result,
  render::{GpuHandle, RenderConfig},
};

/// Copies the rendered texture back to the CPU and encodes it as PNG.
///
/// `config.width` must keep each row a multiple of 256 bytes.
pub fn read_png(handle: &GpuHandle, config: RenderConfig) -> Result<Vec<u8>> {
  let buffer = copy_to_buffer(handle, config);

  let slice = buffer.slice(..);
  let (tx, rx) = mpsc::channel();
  slice.map_async(wgpu::MapMode::Read, move |result| {
    let _ = tx.send(result);
  });
  handle.device.poll(wgpu::PollType::Wait).map_err(Error::gpu)?;
  rx.recv().map_err(Error::gpu)?.map_err(Error::gpu)?;

  let pixels = slice.get_mapped_range().to_vec();
  buffer.unmap();

  encode_png(config.width, config.height, pixels)
}

fn copy_to_buffer(handle: &GpuHandle, config: RenderConfig) -> wgpu::Buffer {
  let bytes_per_row = 4 * config.width;
  let buffer = handle.device.create_buffer(&wgpu::BufferDescriptor {
    label:              Some("Readback Buffer"),
    size:               u64::from(bytes_per_row) * u64::from(config.height),
    usage:              wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
    mapped_at_creation: false,
  });

  let mut encoder = handle
    .device
    .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Readback Encoder") });
  encoder.copy_texture_to_buffer(
    handle.texture.as_image_copy(),
    wgpu::TexelCopyBufferInfo {
      buffer: &buffer,
      layout: wgpu::TexelCopyBufferLayout {
        offset:         0,
        bytes_per_row:  Some(bytes_per_row),
        rows_per_image: Some(config.height),
      },
    },
    config.extent_3d(),
  );
  handle.queue.submit([encoder.finish()]);

  buffer
}

fn encode_png(width: u32, height: u32, pixels: Vec<u8>) -> Result<Vec<u8>> {
  let image = RgbaImage::from_raw(width, height, pixels)
    .ok_or_else(|| Error::Gpu(format!("readback does not hold {width}x{height} pixels")))?;

  let mut png = Vec::new();
  image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
  log::debug!("encoded {width}x{height} png ({} bytes)", png.len());
  Ok(png)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pixels_encode_as_png() {
    let pixels = [255, 0, 0, 255].repeat(6);
    let png = encode_png(3, 2, pixels).unwrap();

    let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (3, 2));
    assert_eq!(decoded.get_pixel(2, 1).0, [255, 0, 0, 255]);
  }

  #[test]
  fn short_readback_is_an_error() {
    assert!(matches!(encode_png(4, 4, vec![0; 8]), Err(Error::Gpu(_))));
  }
}

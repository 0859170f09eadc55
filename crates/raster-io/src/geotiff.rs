//! Single-band GeoTIFF reading and writing through the `tiff` crate.
//!
//! Georeferencing is carried in the standard GeoTIFF tags:
//!
//! | Tag   | Name                | Use                                       |
//! |-------|---------------------|-------------------------------------------|
//! | 33550 | ModelPixelScale     | pixel size for north-up rasters           |
//! | 33922 | ModelTiepoint       | upper-left corner for north-up rasters    |
//! | 34264 | ModelTransformation | full 4x4 matrix for rotated rasters       |
//! | 34735 | GeoKeyDirectory     | model type, EPSG code                     |
//! | 34737 | GeoAsciiParams      | PROJ string when there is no EPSG code    |
//! | 42113 | GDAL_NODATA         | NoData sentinel as ASCII                  |

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use heat_common::CrsCode;
use projection::AffineTransform;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tracing::{debug, warn};

use crate::error::{RasterError, Result};
use crate::raster::Raster;

const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
const TAG_MODEL_TIEPOINT: u16 = 33922;
const TAG_MODEL_TRANSFORMATION: u16 = 34264;
const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
const TAG_GEO_ASCII_PARAMS: u16 = 34737;
const TAG_GDAL_NODATA: u16 = 42113;

const KEY_MODEL_TYPE: u16 = 1024;
const KEY_RASTER_TYPE: u16 = 1025;
const KEY_CITATION: u16 = 1026;
const KEY_GEOGRAPHIC_TYPE: u16 = 2048;
const KEY_PROJECTED_CS_TYPE: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
/// GeoKey value meaning "user defined".
const USER_DEFINED: u16 = 32767;

/// GeoTIFF tags have named variants in `tiff`; entries are only found under
/// the name the decoder stores them by, never under `Tag::Unknown`.
fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Read band 1 of a GeoTIFF file.
pub fn read_geotiff(path: impl AsRef<Path>) -> Result<Raster> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RasterError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let raster = decode_geotiff(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        crs = ?raster.crs(),
        "Read GeoTIFF"
    );
    Ok(raster)
}

/// Decode a GeoTIFF from any `Read + Seek` source.
pub fn decode_geotiff<R: Read + Seek>(reader: R) -> Result<Raster> {
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let data = samples_as_f32(decoder.read_image()?)?;
    if data.len() < width * height {
        return Err(RasterError::InvalidDimensions {
            width,
            height,
            len: data.len(),
        });
    }
    // Interleaved multi-sample images: keep the first sample of each pixel.
    let samples_per_pixel = data.len() / (width * height).max(1);
    let data = if samples_per_pixel > 1 {
        data.into_iter().step_by(samples_per_pixel).collect()
    } else {
        data
    };

    let transform = read_transform(&mut decoder)?;
    let mut raster = Raster::new(width, height, data, transform)?;

    if let Some(crs) = read_crs(&mut decoder) {
        raster = raster.with_crs(crs);
    }
    if let Some(nodata) = read_nodata(&mut decoder) {
        raster = raster.with_nodata(nodata);
    }

    Ok(raster)
}

fn samples_as_f32(result: DecodingResult) -> Result<Vec<f32>> {
    let data = match result {
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f32::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        _ => {
            return Err(RasterError::UnsupportedSampleFormat(
                "64-bit integer samples".to_string(),
            ))
        }
    };
    Ok(data)
}

/// Affine transform from ModelTransformation, or ModelPixelScale + ModelTiepoint.
///
/// A file with neither is treated as ungeoreferenced (identity transform).
fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<AffineTransform> {
    if let Ok(m) = decoder.get_tag_f64_vec(tag(TAG_MODEL_TRANSFORMATION)) {
        if m.len() < 16 {
            return Err(RasterError::invalid_georeference(format!(
                "ModelTransformation has {} values, expected 16",
                m.len()
            )));
        }
        return Ok(AffineTransform::new(m[0], m[1], m[3], m[4], m[5], m[7]));
    }

    let scale = decoder.get_tag_f64_vec(tag(TAG_MODEL_PIXEL_SCALE)).ok();
    let tiepoint = decoder.get_tag_f64_vec(tag(TAG_MODEL_TIEPOINT)).ok();

    match (scale, tiepoint) {
        (Some(scale), Some(tiepoint)) if scale.len() >= 2 && tiepoint.len() >= 6 => {
            // tiepoint: [I, J, K, X, Y, Z]
            let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
            let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
            Ok(AffineTransform::from_origin(origin_x, origin_y, scale[0], scale[1]))
        }
        (None, None) => {
            warn!("GeoTIFF has no georeferencing tags, using identity transform");
            Ok(AffineTransform::identity())
        }
        _ => Err(RasterError::invalid_georeference(
            "incomplete ModelPixelScale/ModelTiepoint tags",
        )),
    }
}

/// CRS from the GeoKey directory: an EPSG code or a PROJ string citation.
fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<CrsCode> {
    let keys = decoder.get_tag_u16_vec(tag(TAG_GEO_KEY_DIRECTORY)).ok()?;
    let ascii = decoder.get_tag_ascii_string(tag(TAG_GEO_ASCII_PARAMS)).ok();
    crs_from_geo_keys(&keys, ascii.as_deref())
}

/// Resolve the CRS of a GeoKey directory.
///
/// `GTModelTypeGeoKey` decides which code key applies: a projected model
/// only takes `ProjectedCSTypeGeoKey`, a geographic one only
/// `GeographicTypeGeoKey`. The geographic key of a projected file names its
/// datum, not the coordinate space of the grid.
fn crs_from_geo_keys(keys: &[u16], ascii: Option<&str>) -> Option<CrsCode> {
    if keys.len() < 4 {
        return None;
    }
    let count = keys[3] as usize;

    let mut model_type = None;
    let mut geographic = None;
    let mut projected = None;
    let mut citation = None;
    for entry in keys[4..].chunks_exact(4).take(count) {
        let (key, location, len, value) = (entry[0], entry[1], entry[2], entry[3]);
        match key {
            KEY_MODEL_TYPE if location == 0 => model_type = Some(value),
            KEY_GEOGRAPHIC_TYPE if location == 0 => geographic = Some(value),
            KEY_PROJECTED_CS_TYPE if location == 0 => projected = Some(value),
            KEY_CITATION if location == TAG_GEO_ASCII_PARAMS => {
                citation = Some((value as usize, len as usize));
            }
            _ => {}
        }
    }

    let code = match model_type {
        Some(MODEL_TYPE_PROJECTED) => projected,
        Some(MODEL_TYPE_GEOGRAPHIC) => geographic,
        _ => projected.or(geographic),
    };
    if let Some(code) = code.filter(|&c| c != 0 && c != USER_DEFINED) {
        return Some(CrsCode::Epsg(code as u32));
    }

    let (offset, len) = citation?;
    let ascii = ascii?;
    let text = ascii.get(offset..(offset + len).min(ascii.len()))?;
    let text = text.trim_end_matches(['|', '\0']).trim();
    text.starts_with('+').then(|| CrsCode::Proj(text.to_string()))
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder
        .get_tag_ascii_string(tag(TAG_GDAL_NODATA))
        .ok()?;
    let text = text.trim_end_matches('\0').trim();
    match text.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) if text.eq_ignore_ascii_case("nan") => Some(f64::NAN),
        Err(_) => {
            warn!(value = text, "Ignoring unparseable GDAL_NODATA tag");
            None
        }
    }
}

/// Write a raster as a single-band 32-bit float GeoTIFF.
pub fn write_geotiff(raster: &Raster, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    encode_geotiff(raster, &mut writer)?;
    writer.flush()?;
    debug!(path = %path.display(), "Wrote GeoTIFF");
    Ok(())
}

/// Encode a raster as GeoTIFF into any `Write + Seek` sink.
pub fn encode_geotiff<W: Write + Seek>(raster: &Raster, writer: W) -> Result<()> {
    let mut encoder = TiffEncoder::new(writer)?;
    let mut image =
        encoder.new_image::<Gray32Float>(raster.width() as u32, raster.height() as u32)?;

    let t = raster.transform();
    if t.is_rectilinear() && t.a > 0.0 && t.e < 0.0 {
        let scale = [t.a, -t.e, 0.0];
        let tiepoint = [0.0, 0.0, 0.0, t.c, t.f, 0.0];
        image
            .encoder()
            .write_tag(tag(TAG_MODEL_PIXEL_SCALE), &scale[..])?;
        image
            .encoder()
            .write_tag(tag(TAG_MODEL_TIEPOINT), &tiepoint[..])?;
    } else {
        let matrix = [
            t.a, t.b, 0.0, t.c, //
            t.d, t.e, 0.0, t.f, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        image
            .encoder()
            .write_tag(tag(TAG_MODEL_TRANSFORMATION), &matrix[..])?;
    }

    let (keys, ascii) = geo_keys(raster.crs());
    image
        .encoder()
        .write_tag(tag(TAG_GEO_KEY_DIRECTORY), &keys[..])?;
    if let Some(ascii) = ascii {
        image
            .encoder()
            .write_tag(tag(TAG_GEO_ASCII_PARAMS), ascii.as_str())?;
    }

    if let Some(nodata) = raster.nodata() {
        image
            .encoder()
            .write_tag(tag(TAG_GDAL_NODATA), format_nodata(nodata).as_str())?;
    }

    image.write_data(raster.data())?;
    Ok(())
}

/// GeoKey directory entries, sorted by key id, plus the GeoAsciiParams payload.
fn geo_keys(crs: Option<&CrsCode>) -> (Vec<u16>, Option<String>) {
    let mut entries: Vec<[u16; 4]> = Vec::new();
    let mut ascii = None;

    match crs {
        Some(crs) => {
            let model = if crs.is_geographic() {
                MODEL_TYPE_GEOGRAPHIC
            } else {
                MODEL_TYPE_PROJECTED
            };
            entries.push([KEY_MODEL_TYPE, 0, 1, model]);
            entries.push([KEY_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA]);

            match crs.epsg().and_then(|code| u16::try_from(code).ok()) {
                Some(code) => {
                    let key = if crs.is_geographic() {
                        KEY_GEOGRAPHIC_TYPE
                    } else {
                        KEY_PROJECTED_CS_TYPE
                    };
                    entries.push([key, 0, 1, code]);
                }
                None => {
                    let text = format!("{}|", crs_text(crs));
                    entries.push([KEY_CITATION, TAG_GEO_ASCII_PARAMS, text.len() as u16, 0]);
                    ascii = Some(text);
                }
            }
        }
        None => {
            entries.push([KEY_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA]);
        }
    }

    let mut keys = vec![1, 1, 0, entries.len() as u16];
    for entry in entries {
        keys.extend_from_slice(&entry);
    }
    (keys, ascii)
}

fn crs_text(crs: &CrsCode) -> String {
    match crs {
        CrsCode::Proj(def) => def.clone(),
        other => other.to_string(),
    }
}

fn format_nodata(nodata: f64) -> String {
    if nodata.is_nan() {
        "nan".to_string()
    } else if nodata.fract() == 0.0 && nodata.abs() < 1e15 {
        format!("{}", nodata as i64)
    } else {
        format!("{}", nodata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_keys_projected_epsg() {
        let (keys, ascii) = geo_keys(Some(&CrsCode::Epsg(32611)));
        assert_eq!(&keys[..4], &[1, 1, 0, 3]);
        assert_eq!(&keys[4..8], &[KEY_MODEL_TYPE, 0, 1, MODEL_TYPE_PROJECTED]);
        assert_eq!(&keys[12..16], &[KEY_PROJECTED_CS_TYPE, 0, 1, 32611]);
        assert!(ascii.is_none());
    }

    #[test]
    fn test_geo_keys_geographic() {
        let (keys, _) = geo_keys(Some(&CrsCode::wgs84()));
        assert_eq!(&keys[4..8], &[KEY_MODEL_TYPE, 0, 1, MODEL_TYPE_GEOGRAPHIC]);
        assert_eq!(&keys[12..16], &[KEY_GEOGRAPHIC_TYPE, 0, 1, 4326]);
    }

    #[test]
    fn test_geo_keys_proj_string_uses_citation() {
        let crs = CrsCode::Proj("+proj=utm +zone=11 +datum=WGS84".into());
        let (keys, ascii) = geo_keys(Some(&crs));
        let ascii = ascii.unwrap();
        assert_eq!(ascii, "+proj=utm +zone=11 +datum=WGS84|");
        assert_eq!(keys[12], KEY_CITATION);
        assert_eq!(keys[14] as usize, ascii.len());
    }

    #[test]
    fn test_projected_model_ignores_datum_geographic_key() {
        // GDAL layout for a user-defined projected CRS on a WGS84 datum
        let keys = [
            1, 1, 0, 4, //
            KEY_MODEL_TYPE, 0, 1, MODEL_TYPE_PROJECTED, //
            KEY_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA, //
            KEY_GEOGRAPHIC_TYPE, 0, 1, 4326, //
            KEY_PROJECTED_CS_TYPE, 0, 1, USER_DEFINED,
        ];
        assert_eq!(crs_from_geo_keys(&keys, None), None);
    }

    #[test]
    fn test_projected_model_prefers_projected_code() {
        let keys = [
            1, 1, 0, 3, //
            KEY_MODEL_TYPE, 0, 1, MODEL_TYPE_PROJECTED, //
            KEY_GEOGRAPHIC_TYPE, 0, 1, 4326, //
            KEY_PROJECTED_CS_TYPE, 0, 1, 32611,
        ];
        assert_eq!(crs_from_geo_keys(&keys, None), Some(CrsCode::Epsg(32611)));
    }

    #[test]
    fn test_user_defined_projected_falls_back_to_citation() {
        let ascii = "+proj=utm +zone=11 +datum=WGS84|";
        let keys = [
            1, 1, 0, 4, //
            KEY_MODEL_TYPE, 0, 1, MODEL_TYPE_PROJECTED, //
            KEY_CITATION, TAG_GEO_ASCII_PARAMS, ascii.len() as u16, 0, //
            KEY_GEOGRAPHIC_TYPE, 0, 1, 4326, //
            KEY_PROJECTED_CS_TYPE, 0, 1, USER_DEFINED,
        ];
        assert_eq!(
            crs_from_geo_keys(&keys, Some(ascii)),
            Some(CrsCode::Proj("+proj=utm +zone=11 +datum=WGS84".into()))
        );
    }

    #[test]
    fn test_geographic_model_and_written_keys_resolve() {
        let (keys, _) = geo_keys(Some(&CrsCode::wgs84()));
        assert_eq!(crs_from_geo_keys(&keys, None), Some(CrsCode::wgs84()));
        let (keys, _) = geo_keys(Some(&CrsCode::Epsg(32611)));
        assert_eq!(crs_from_geo_keys(&keys, None), Some(CrsCode::Epsg(32611)));
    }

    #[test]
    fn test_georeference_tags_use_named_variants() {
        assert_eq!(tag(TAG_MODEL_PIXEL_SCALE), Tag::ModelPixelScaleTag);
        assert_eq!(tag(TAG_MODEL_TIEPOINT), Tag::ModelTiepointTag);
        assert_eq!(tag(TAG_GEO_KEY_DIRECTORY), Tag::GeoKeyDirectoryTag);
        assert_eq!(tag(TAG_GDAL_NODATA), Tag::GdalNodata);
    }

    #[test]
    fn test_format_nodata() {
        assert_eq!(format_nodata(-9999.0), "-9999");
        assert_eq!(format_nodata(0.0), "0");
        assert_eq!(format_nodata(0.5), "0.5");
    }
}

/*!
 * Tests for unit grouping, chunk boundaries and stream splitting
 */

use anyhow::Result;

use doctrans::extraction::{Extractor, PartKind, SourcePart};
use doctrans::translation::{ChunkLimits, UnitKind, build_units, chunk_units, split_stream};

use crate::common::numbered_paragraphs;

fn plain_text_segments(text: &str) -> Result<Vec<doctrans::Segment>> {
    let parts = [SourcePart {
        name: "document.txt",
        kind: PartKind::PlainText,
        content: text,
    }];
    Ok(Extractor::new().extract(&parts)?.segments)
}

#[test]
fn test_chunkUnits_scenarioB_shouldYieldFourChunksInOrder() -> Result<()> {
    let segments = plain_text_segments(&numbered_paragraphs(200))?;
    let units = build_units(&segments, UnitKind::Segment);

    let chunks = chunk_units(&units, ChunkLimits::units(50));

    assert_eq!(segments.len(), 200);
    assert_eq!(chunks.len(), 4);
    assert!(chunks.iter().all(|chunk| chunk.len() == 50));

    let concatenated: Vec<&str> = chunks
        .iter()
        .flat_map(|chunk| units[chunk.range()].iter().map(|unit| unit.text.as_str()))
        .collect();
    let original: Vec<&str> = segments.iter().map(|segment| segment.text.as_str()).collect();
    assert_eq!(concatenated, original);
    Ok(())
}

#[test]
fn test_chunkUnits_byChars_shouldCoverEveryUnitOnce() -> Result<()> {
    let segments = plain_text_segments(&numbered_paragraphs(120))?;
    let units = build_units(&segments, UnitKind::Segment);

    let chunks = chunk_units(&units, ChunkLimits::new(Some(50), Some(500)));

    let mut expected_start = 0;
    for (position, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, position);
        assert_eq!(chunk.start, expected_start);
        let cost: usize = units[chunk.range()].iter().map(|unit| 1 + unit.text.chars().count()).sum();
        assert!(cost <= 500 || chunk.len() == 1);
        expected_start = chunk.end;
    }
    assert_eq!(expected_start, units.len());
    Ok(())
}

#[test]
fn test_buildUnits_paragraphMode_shouldCoverSegmentsOnce() -> Result<()> {
    let segments = plain_text_segments("One. Two.\n\nThree.")?;

    let units = build_units(&segments, UnitKind::Paragraph);

    let members: Vec<usize> = units.iter().flat_map(|unit| unit.members.iter().copied()).collect();
    assert_eq!(members, (1..=segments.len()).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_splitStream_shouldReassembleExactly() {
    let text = format!("{}\n\nA closing sentence! And another one? Done.", numbered_paragraphs(30));

    for max_chars in [20, 64, 200, 5000] {
        let pieces = split_stream(&text, max_chars, None);
        assert_eq!(pieces.concat(), text, "max_chars = {}", max_chars);
    }
}

#[test]
fn test_splitStream_withDelimiter_shouldStartPiecesAtMarkers() {
    let text: String = (1..=40).map(|n| format!("§Segment {} text.", n)).collect();

    let pieces = split_stream(&text, 60, Some('§'));

    assert!(pieces.len() > 1);
    assert!(pieces.iter().all(|piece| piece.starts_with('§')));
    assert_eq!(pieces.concat(), text);
}

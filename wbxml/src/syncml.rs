/*!
# SyncML code tables

Ready-made tag code space for SyncML representation documents, covering
the SyncML command vocabulary (page 0), the MetInf vocabulary (page 1)
and the signature extension vocabulary (page 8).

SyncML does not use coded attributes; pair this with an empty attribute
code space.
*/
use crate::codepage::CodeSpace;

const TAGS: &'static [(u8, u8, &'static str)] = &[
	(0, 0x05, "Add"),
	(0, 0x06, "Alert"),
	(0, 0x07, "Archive"),
	(0, 0x08, "Atomic"),
	(0, 0x09, "Chal"),
	(0, 0x0A, "Cmd"),
	(0, 0x0B, "CmdID"),
	(0, 0x0C, "CmdRef"),
	(0, 0x0D, "Copy"),
	(0, 0x0E, "Cred"),
	(0, 0x0F, "Data"),
	(0, 0x10, "Delete"),
	(0, 0x11, "Exec"),
	(0, 0x12, "Final"),
	(0, 0x13, "Get"),
	(0, 0x14, "Item"),
	(0, 0x15, "Lang"),
	(0, 0x16, "LocName"),
	(0, 0x17, "LocURI"),
	(0, 0x18, "Map"),
	(0, 0x19, "MapItem"),
	(0, 0x1A, "Meta"),
	(0, 0x1B, "MsgID"),
	(0, 0x1C, "MsgRef"),
	(0, 0x1D, "NoResp"),
	(0, 0x1E, "NoResults"),
	(0, 0x1F, "Put"),
	(0, 0x20, "Replace"),
	(0, 0x21, "RespURI"),
	(0, 0x22, "Results"),
	(0, 0x23, "Search"),
	(0, 0x24, "Sequence"),
	(0, 0x25, "SessionID"),
	(0, 0x26, "SftDel"),
	(0, 0x27, "Source"),
	(0, 0x28, "SourceRef"),
	(0, 0x29, "Status"),
	(0, 0x2A, "Sync"),
	(0, 0x2B, "SyncBody"),
	(0, 0x2C, "SyncHdr"),
	(0, 0x2D, "SyncML"),
	(0, 0x2E, "Target"),
	(0, 0x2F, "TargetRef"),
	(0, 0x31, "VerDTD"),
	(0, 0x32, "VerProto"),
	(0, 0x33, "NumberOfChanges"),
	(0, 0x34, "MoreData"),
	(0, 0x35, "Field"),
	(0, 0x36, "Filter"),
	(0, 0x37, "Record"),
	(0, 0x38, "FilterType"),
	(0, 0x39, "SourceParent"),
	(0, 0x3A, "TargetParent"),
	(0, 0x3B, "Move"),
	(0, 0x3C, "Correlator"),
	(1, 0x05, "Anchor"),
	(1, 0x06, "EMI"),
	(1, 0x07, "Format"),
	(1, 0x08, "FreeID"),
	(1, 0x09, "FreeMem"),
	(1, 0x0A, "Last"),
	(1, 0x0B, "Mark"),
	(1, 0x0C, "MaxMsgSize"),
	(1, 0x0D, "Mem"),
	(1, 0x0E, "MetInf"),
	(1, 0x0F, "Next"),
	(1, 0x10, "NextNonce"),
	(1, 0x11, "SharedMem"),
	(1, 0x12, "Size"),
	(1, 0x13, "Type"),
	(1, 0x14, "Version"),
	(1, 0x15, "MaxObjSize"),
	(1, 0x16, "FieldLevel"),
	(8, 0x05, "CS"),
	(8, 0x06, "HorRecv"),
	(8, 0x07, "HorSend"),
	(8, 0x08, "CertSign"),
	(8, 0x09, "Sign"),
	(8, 0x0A, "Start"),
	(8, 0x0B, "Stop"),
];

/// Build the SyncML tag code space.
pub fn tags() -> CodeSpace {
	let mut space = CodeSpace::new();
	for &(page, code, name) in TAGS {
		space.define(page, code, name);
	}
	space
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn core_vocabulary_resolves() {
		let t = tags();
		assert_eq!(t.name(0, 0x2D).unwrap(), "SyncML");
		assert_eq!(t.name(1, 0x06).unwrap(), "EMI");
		assert_eq!(t.name(8, 0x09).unwrap(), "Sign");
		assert_eq!(t.find("SyncHdr").unwrap(), (0x2C, 0));
		assert_eq!(t.find("Sign").unwrap(), (0x09, 8));
	}
}

// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

// These tests drive the in-process hub and spoke bridges end to end. Chain
// interaction goes through `MockChainClient`.
